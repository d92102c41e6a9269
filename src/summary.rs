// ABOUTME: Turns a batch tally into user-facing notices
// ABOUTME: Errors, skip counts, and success or nothing-happened, in display order

use crate::actions::Action;
use crate::i18n::LangPack;
use crate::uploader::BatchTally;

/// Error lines shown before the list is cut off
pub const MAX_ERROR_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Errors,
    Blacklisted,
    LimitSkipped,
    Success,
    Nothing,
    /// Batch stopped during setup, before any reference was handled
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub fn summarize(tally: BatchTally, action: Action, limit: usize, lang: &LangPack) -> Vec<Notice> {
    let mut notices = Vec::new();

    if !tally.errors.is_empty() {
        let mut message = format!(
            "{}: \n{}",
            lang.errors_header(action),
            tally.errors[..tally.errors.len().min(MAX_ERROR_LINES)].join("\n")
        );
        if tally.errors.len() > MAX_ERROR_LINES {
            message.push_str("\n...");
        }
        notices.push(Notice::new(NoticeKind::Errors, message));
    }

    if tally.blacklisted > 0 {
        notices.push(Notice::new(
            NoticeKind::Blacklisted,
            lang.blacklisted_text(tally.blacklisted),
        ));
    }

    if tally.skipped > 0 {
        notices.push(Notice::new(
            NoticeKind::LimitSkipped,
            lang.limit_skipped_text(action, limit, tally.skipped),
        ));
    }

    if tally.success > 0 {
        notices.push(Notice::new(
            NoticeKind::Success,
            lang.success_text(action, tally.success),
        ));
    } else if tally.errors.is_empty() && tally.blacklisted == 0 && tally.skipped == 0 {
        notices.push(Notice::new(NoticeKind::Nothing, lang.nothing_text(action)));
    }

    notices
}
