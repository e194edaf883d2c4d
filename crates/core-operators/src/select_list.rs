//! `TransformStringBySelectList`: pick a transformer from a list and hand
//! the bound target over to it.

use crate::error::{OperatorError, Outcome};
use crate::input::SelectItem;
use crate::operator::{Operator, OperatorRequest};
use crate::session::Session;
use crate::spec;
use core_events::OperatorEvent;
use heck::ToTitleCase;
use tracing::debug;

impl Session {
    /// Configured transformers that exist, then configured external commands.
    fn select_list_items(&self) -> Vec<SelectItem> {
        let file = &self.config.file;
        file.select_list
            .transformers
            .iter()
            .filter(|name| spec::lookup(name).is_some())
            .chain(file.external_command.iter().map(|c| &c.name))
            .map(|name| SelectItem {
                name: name.clone(),
                display_name: name.to_title_case(),
            })
            .collect()
    }

    /// Show the list; the answer becomes a request carrying this operator's
    /// target, count and register.
    fn choose_transformer(&mut self, op: &mut Operator) -> Option<OperatorRequest> {
        let items = self.select_list_items();
        self.events.emit(OperatorEvent::SelectListOpened { items: items.len() });
        let Some(choice) = self.input.select(&items) else {
            debug!(target: "operator.select_list", items = items.len(), "select_list_cancelled");
            return None;
        };
        debug!(target: "operator.select_list", choice = %choice, "select_list_confirmed");
        if let Some(register) = op.register {
            self.registers.select(register);
        }
        let mut request = OperatorRequest::new(choice).count(op.count);
        if let Some(target) = op.target.take() {
            request = request.target_instance(target);
        }
        Some(request)
    }

    pub(crate) fn open_select_list(&mut self, op: &mut Operator) -> Result<Outcome, OperatorError> {
        let Some(request) = self.choose_transformer(op) else {
            return Ok(Outcome::Cancelled);
        };
        self.run(request)?;
        Ok(Outcome::Delegated)
    }

    pub(crate) async fn open_select_list_async(
        &mut self,
        op: &mut Operator,
    ) -> Result<Outcome, OperatorError> {
        let Some(request) = self.choose_transformer(op) else {
            return Ok(Outcome::Cancelled);
        };
        Box::pin(self.run_async(request)).await?;
        Ok(Outcome::Delegated)
    }
}
