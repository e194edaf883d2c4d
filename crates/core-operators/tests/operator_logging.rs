mod common;
use common::*;

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

fn capture(f: impl FnOnce()) -> String {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_writer(BufferWriter { inner: buf.clone() })
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .finish();
    with_default(subscriber, f);
    let bytes = buf.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn execution_is_logged_under_operator_targets() {
    let logs = capture(|| {
        let mut s = session("abc def\n", (0, 0));
        run_on(&mut s, "Delete", "InnerWord");
    });
    assert!(logs.contains("operator.session"), "{logs}");
    assert!(logs.contains("operator.base"), "{logs}");
    assert!(logs.contains("executed"), "{logs}");
    assert!(logs.contains("Delete"), "{logs}");
}

#[test]
fn insert_session_is_logged() {
    let logs = capture(|| {
        let mut s = session("abc\n", (0, 0));
        run(&mut s, "InsertAfter");
        s.editor.type_text("x");
        s.leave_insert_mode();
    });
    assert!(logs.contains("insert_started"), "{logs}");
    assert!(logs.contains("insert_finished"), "{logs}");
}
