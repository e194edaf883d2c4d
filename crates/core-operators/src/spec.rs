//! Operator registry.
//!
//! Every operator is a row in `OPERATORS`: a name, behaviour flags, an
//! optional default target, the stay option it consults, optional blockwise
//! normalization, an optional input prompt, and the `Behavior` the engine
//! dispatches on. Variants that only differ by configuration (the surround
//! family, the insert-at-X family) are separate rows sharing one behaviour.

use bitflags::bitflags;
use core_config::StayOption;
use core_state::BlockAnchor;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OperatorFlags: u16 {
        /// Eligible for `Repeat`.
        const RECORDABLE = 1 << 0;
        /// Record the changed range as the `[`/`]` marks.
        const TRACK_CHANGE = 1 << 1;
        /// Flash the selected target.
        const FLASH_TARGET = 1 << 2;
        /// Binding fails without a selectable target.
        const REQUIRE_TARGET = 1 << 3;
        /// Keep the cursor in place when the target is linewise.
        const STAY_ON_LINEWISE = 1 << 4;
        /// Cursor returns to the start of the changed text.
        const SET_POINT = 1 << 5;
        /// Widen the selection to whole rows before mutating.
        const LINEWISE = 1 << 6;
        /// A count repeats the inserted text.
        const SUPPORTS_INSERTION_COUNT = 1 << 7;
        /// Blockwise visual keeps only the top selection afterwards.
        const KEEP_TOP_BLOCK = 1 << 8;
    }
}

const BASE: OperatorFlags = OperatorFlags::RECORDABLE
    .union(OperatorFlags::FLASH_TARGET)
    .union(OperatorFlags::REQUIRE_TARGET);
const TRANSFORM: OperatorFlags = BASE
    .union(OperatorFlags::TRACK_CHANGE)
    .union(OperatorFlags::SET_POINT);
const ROWS: OperatorFlags = TRANSFORM.union(OperatorFlags::LINEWISE);
const DELETE: OperatorFlags = BASE
    .union(OperatorFlags::TRACK_CHANGE)
    .difference(OperatorFlags::FLASH_TARGET);
const YANK: OperatorFlags = BASE.union(OperatorFlags::TRACK_CHANGE);
const PUT: OperatorFlags = OperatorFlags::RECORDABLE
    .union(OperatorFlags::TRACK_CHANGE)
    .union(OperatorFlags::FLASH_TARGET);
const INSERT: OperatorFlags =
    OperatorFlags::RECORDABLE.union(OperatorFlags::SUPPORTS_INSERTION_COUNT);
const CHANGE: OperatorFlags = OperatorFlags::RECORDABLE
    .union(OperatorFlags::TRACK_CHANGE)
    .union(OperatorFlags::REQUIRE_TARGET);

/// Prompt an operator issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    pub chars_max: usize,
    /// Used when the answer is empty.
    pub default: Option<&'static str>,
    /// Prompt only after the target selected something.
    pub after_select: bool,
}

impl InputSpec {
    const fn chars(chars_max: usize) -> Self {
        Self {
            chars_max,
            default: None,
            after_select: false,
        }
    }
    const fn after_select(self) -> Self {
        Self {
            after_select: true,
            ..self
        }
    }
    const fn or_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }
}

/// Per-selection text rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    ToggleCase,
    UpperCase,
    LowerCase,
    CamelCase,
    SnakeCase,
    PascalCase,
    DashCase,
    TitleCase,
    EncodeUriComponent,
    DecodeUriComponent,
    TrimString,
    CompactSpaces,
    RemoveLeadingWhiteSpaces,
    JoinWithKeepingSpace,
    JoinByInput,
    SplitString { keep_splitter: bool },
    Reverse,
}

/// Row-level edits delegated to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOp {
    Indent,
    Outdent,
    AutoIndent,
    ToggleLineComments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurroundMode {
    Surround,
    /// Surround every word inside the target.
    MapSurround,
    /// Pair picked from the input char.
    Delete,
    /// Pair picked by the target (any-pair text objects).
    DeleteDetected,
    Change,
    ChangeDetected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertKind {
    Insert,
    Replace,
    After,
    AtBeginningOfLine,
    AfterEndOfLine,
    AtLastInsert,
    AboveWithNewline,
    BelowWithNewline,
    AtStartOfTarget,
    AtEndOfTarget,
    AtStartOfSelection,
    AtEndOfSelection,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Delete,
    Yank,
    Transform(Transform),
    Rows(RowOp),
    Surround(SurroundMode),
    ReplaceWithRegister { swap: bool },
    ExternalCommand,
    SelectList,
    Join,
    Repeat,
    Mark,
    /// Cursor-local number bump.
    Increase { step: i64 },
    /// Every number in the target, chained.
    IncrementNumber { step: i64 },
    Put { before: bool, select: bool },
    Replace,
    Insert(InsertKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    pub name: &'static str,
    pub flags: OperatorFlags,
    pub default_target: Option<&'static str>,
    pub stay_option: Option<StayOption>,
    pub block_anchor: Option<BlockAnchor>,
    pub input: Option<InputSpec>,
    pub behavior: Behavior,
}

impl OperatorSpec {
    const fn new(name: &'static str, flags: OperatorFlags, behavior: Behavior) -> Self {
        Self {
            name,
            flags,
            default_target: None,
            stay_option: None,
            block_anchor: None,
            input: None,
            behavior,
        }
    }
    const fn target(self, target: &'static str) -> Self {
        Self {
            default_target: Some(target),
            ..self
        }
    }
    const fn stay(self, option: StayOption) -> Self {
        Self {
            stay_option: Some(option),
            ..self
        }
    }
    const fn block(self, anchor: BlockAnchor) -> Self {
        Self {
            block_anchor: Some(anchor),
            ..self
        }
    }
    const fn input(self, input: InputSpec) -> Self {
        Self {
            input: Some(input),
            ..self
        }
    }
    const fn with(self, flags: OperatorFlags) -> Self {
        Self {
            flags: self.flags.union(flags),
            ..self
        }
    }
    const fn without(self, flags: OperatorFlags) -> Self {
        Self {
            flags: self.flags.difference(flags),
            ..self
        }
    }

    pub fn has(&self, flag: OperatorFlags) -> bool {
        self.flags.contains(flag)
    }
}

const fn delete(name: &'static str) -> OperatorSpec {
    OperatorSpec::new(name, DELETE, Behavior::Delete).stay(StayOption::OnDelete)
}

const fn yank(name: &'static str) -> OperatorSpec {
    OperatorSpec::new(name, YANK, Behavior::Yank).stay(StayOption::OnYank)
}

const fn transform(name: &'static str, t: Transform) -> OperatorSpec {
    OperatorSpec::new(name, TRANSFORM, Behavior::Transform(t)).stay(StayOption::OnTransformString)
}

const fn rows(name: &'static str, op: RowOp) -> OperatorSpec {
    OperatorSpec::new(name, ROWS, Behavior::Rows(op)).stay(StayOption::OnTransformString)
}

const fn surround(name: &'static str, mode: SurroundMode) -> OperatorSpec {
    OperatorSpec::new(name, TRANSFORM, Behavior::Surround(mode)).stay(StayOption::OnTransformString)
}

const fn insert(name: &'static str, kind: InsertKind) -> OperatorSpec {
    OperatorSpec::new(name, INSERT, Behavior::Insert(kind))
}

const fn change(name: &'static str) -> OperatorSpec {
    OperatorSpec::new(name, CHANGE, Behavior::Insert(InsertKind::Change))
}

const CHAR: InputSpec = InputSpec::chars(1);

pub static OPERATORS: &[OperatorSpec] = &[
    // delete
    delete("Delete"),
    delete("DeleteRight").target("MoveRight"),
    delete("DeleteLeft").target("MoveLeft"),
    delete("DeleteToLastCharacterOfLine")
        .target("MoveToLastCharacterOfLine")
        .block(BlockAnchor::Start),
    delete("DeleteLine").target("MoveToRelativeLine"),
    // yank
    yank("Yank"),
    yank("YankLine")
        .target("MoveToRelativeLine")
        .with(OperatorFlags::STAY_ON_LINEWISE),
    yank("YankToLastCharacterOfLine").target("MoveToLastCharacterOfLine"),
    // case
    transform("ToggleCase", Transform::ToggleCase),
    transform("ToggleCaseAndMoveRight", Transform::ToggleCase)
        .target("MoveRight")
        .without(OperatorFlags::SET_POINT.union(OperatorFlags::FLASH_TARGET)),
    transform("UpperCase", Transform::UpperCase),
    transform("LowerCase", Transform::LowerCase),
    transform("CamelCase", Transform::CamelCase),
    transform("SnakeCase", Transform::SnakeCase),
    transform("PascalCase", Transform::PascalCase),
    transform("DashCase", Transform::DashCase),
    transform("TitleCase", Transform::TitleCase),
    // strings
    transform("EncodeUriComponent", Transform::EncodeUriComponent),
    transform("DecodeUriComponent", Transform::DecodeUriComponent),
    transform("TrimString", Transform::TrimString),
    transform("CompactSpaces", Transform::CompactSpaces),
    transform("RemoveLeadingWhiteSpaces", Transform::RemoveLeadingWhiteSpaces)
        .with(OperatorFlags::LINEWISE),
    transform("JoinWithKeepingSpace", Transform::JoinWithKeepingSpace)
        .target("MoveToRelativeLineMinimumTwo")
        .with(OperatorFlags::LINEWISE),
    transform("JoinByInput", Transform::JoinByInput)
        .target("MoveToRelativeLineMinimumTwo")
        .with(OperatorFlags::LINEWISE)
        .input(InputSpec::chars(10).after_select()),
    transform("SplitString", Transform::SplitString { keep_splitter: false })
        .target("MoveToRelativeLine")
        .input(InputSpec::chars(10).after_select().or_default("\\n")),
    transform(
        "SplitStringWithKeepingSplitter",
        Transform::SplitString {
            keep_splitter: true,
        },
    )
    .target("MoveToRelativeLine")
    .input(InputSpec::chars(10).after_select().or_default("\\n")),
    transform("Reverse", Transform::Reverse).with(OperatorFlags::LINEWISE),
    // registers
    OperatorSpec::new(
        "ReplaceWithRegister",
        TRANSFORM,
        Behavior::ReplaceWithRegister { swap: false },
    ),
    OperatorSpec::new(
        "SwapWithRegister",
        TRANSFORM,
        Behavior::ReplaceWithRegister { swap: true },
    ),
    // rows
    rows("Indent", RowOp::Indent),
    rows("Outdent", RowOp::Outdent),
    rows("AutoIndent", RowOp::AutoIndent),
    rows("ToggleLineComments", RowOp::ToggleLineComments),
    // surround
    surround("Surround", SurroundMode::Surround).input(CHAR.after_select()),
    surround("SurroundWord", SurroundMode::Surround)
        .target("InnerWord")
        .input(CHAR.after_select()),
    surround("MapSurround", SurroundMode::MapSurround).input(CHAR.after_select()),
    surround("DeleteSurround", SurroundMode::Delete)
        .without(OperatorFlags::REQUIRE_TARGET)
        .input(CHAR),
    surround("DeleteSurroundAnyPair", SurroundMode::DeleteDetected).target("AnyPair"),
    surround(
        "DeleteSurroundAnyPairAllowForwarding",
        SurroundMode::DeleteDetected,
    )
    .target("AnyPairAllowForwarding"),
    surround("ChangeSurround", SurroundMode::Change)
        .without(OperatorFlags::REQUIRE_TARGET)
        .input(CHAR),
    surround("ChangeSurroundAnyPair", SurroundMode::ChangeDetected)
        .target("AnyPair")
        .input(CHAR.after_select()),
    surround(
        "ChangeSurroundAnyPairAllowForwarding",
        SurroundMode::ChangeDetected,
    )
    .target("AnyPairAllowForwarding")
    .input(CHAR.after_select()),
    // external programs and the picker
    OperatorSpec::new("TransformStringByExternalCommand", TRANSFORM, Behavior::ExternalCommand)
        .stay(StayOption::OnTransformString)
        .input(InputSpec::chars(256)),
    OperatorSpec::new(
        "TransformStringBySelectList",
        BASE.difference(OperatorFlags::RECORDABLE),
        Behavior::SelectList,
    ),
    // misc
    OperatorSpec::new("Join", OperatorFlags::RECORDABLE, Behavior::Join),
    OperatorSpec::new("Repeat", OperatorFlags::empty(), Behavior::Repeat),
    OperatorSpec::new("Mark", OperatorFlags::empty(), Behavior::Mark).input(CHAR),
    OperatorSpec::new(
        "Increase",
        OperatorFlags::RECORDABLE.union(OperatorFlags::FLASH_TARGET),
        Behavior::Increase { step: 1 },
    ),
    OperatorSpec::new(
        "Decrease",
        OperatorFlags::RECORDABLE.union(OperatorFlags::FLASH_TARGET),
        Behavior::Increase { step: -1 },
    ),
    OperatorSpec::new("IncrementNumber", TRANSFORM, Behavior::IncrementNumber { step: 1 })
        .target("CurrentSelection"),
    OperatorSpec::new("DecrementNumber", TRANSFORM, Behavior::IncrementNumber { step: -1 })
        .target("CurrentSelection"),
    // put
    OperatorSpec::new(
        "PutBefore",
        PUT,
        Behavior::Put {
            before: true,
            select: false,
        },
    ),
    OperatorSpec::new(
        "PutAfter",
        PUT,
        Behavior::Put {
            before: false,
            select: false,
        },
    ),
    OperatorSpec::new(
        "PutBeforeAndSelect",
        PUT,
        Behavior::Put {
            before: true,
            select: true,
        },
    ),
    OperatorSpec::new(
        "PutAfterAndSelect",
        PUT,
        Behavior::Put {
            before: false,
            select: true,
        },
    ),
    // replace
    OperatorSpec::new(
        "Replace",
        CHANGE
            .union(OperatorFlags::SET_POINT)
            .union(OperatorFlags::KEEP_TOP_BLOCK),
        Behavior::Replace,
    )
    .target("MoveRight")
    .input(CHAR.or_default("\n")),
    // insert
    insert("ActivateInsertMode", InsertKind::Insert),
    insert("ActivateReplaceMode", InsertKind::Replace),
    insert("InsertAfter", InsertKind::After),
    insert("InsertAtBeginningOfLine", InsertKind::AtBeginningOfLine),
    insert("InsertAfterEndOfLine", InsertKind::AfterEndOfLine),
    insert("InsertAtLastInsert", InsertKind::AtLastInsert),
    insert("InsertAboveWithNewline", InsertKind::AboveWithNewline),
    insert("InsertBelowWithNewline", InsertKind::BelowWithNewline),
    insert("InsertAtStartOfTarget", InsertKind::AtStartOfTarget)
        .with(OperatorFlags::REQUIRE_TARGET),
    insert("InsertAtEndOfTarget", InsertKind::AtEndOfTarget).with(OperatorFlags::REQUIRE_TARGET),
    insert("InsertAtStartOfSelection", InsertKind::AtStartOfSelection).block(BlockAnchor::Start),
    insert("InsertAtEndOfSelection", InsertKind::AtEndOfSelection).block(BlockAnchor::End),
    // change
    change("Change"),
    change("Substitute").target("MoveRight"),
    change("SubstituteLine").target("MoveToRelativeLine"),
    change("ChangeToLastCharacterOfLine")
        .target("MoveToLastCharacterOfLine")
        .block(BlockAnchor::Start),
];

/// Look up a registered operator.
pub fn lookup(name: &str) -> Option<&'static OperatorSpec> {
    OPERATORS.iter().find(|s| s.name == name)
}

pub fn operator_names() -> impl Iterator<Item = &'static str> {
    OPERATORS.iter().map(|s| s.name)
}
