//! Budget-bounded text rendering for statements and bound values.
//!
//! Statement text shares one [`RenderBudget`] across the whole rendering
//! pass, including every member of a batch; parameter values each get a
//! fresh, independent budget. Counting is in characters, not bytes.

use crate::error::ObserverError;
use crate::statement::{BatchKind, BoundValue, Statement, ValueFormatter};

/// Marker appended wherever text was cut to fit a budget.
pub const TRUNCATED_OUTPUT: &str = "...";

/// Sentinel length meaning "no limit".
pub const UNLIMITED: i32 = -1;

/// Rendered stand-in for statement shapes the logger does not recognize.
pub const UNKNOWN_STATEMENT: &str = "??Unknown Statement??";

/// Remaining-character counter threaded through one rendering pass.
///
/// Truncation is sticky: once the counter reaches zero every later append
/// is dropped, including batch keywords and the trailing semicolon.
#[derive(Debug)]
pub struct RenderBudget {
    remaining: usize,
    unlimited: bool,
}

impl RenderBudget {
    /// `limit` of [`UNLIMITED`] disables truncation entirely.
    pub fn new(limit: i32) -> Self {
        Self {
            remaining: limit.max(0) as usize,
            unlimited: limit == UNLIMITED,
        }
    }

    /// Append `chunk` to `out`, consuming budget. A chunk longer than the
    /// remaining allowance is cut to exactly `remaining` characters followed
    /// by the truncation marker.
    pub fn append(&mut self, out: &mut String, chunk: &str) {
        if self.unlimited {
            out.push_str(chunk);
            return;
        }
        if self.remaining == 0 {
            return;
        }
        let len = chunk.chars().count();
        if len > self.remaining {
            out.extend(chunk.chars().take(self.remaining));
            out.push_str(TRUNCATED_OUTPUT);
            self.remaining = 0;
        } else {
            out.push_str(chunk);
            self.remaining -= len;
        }
    }

    /// Characters still available; meaningless when unlimited.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        !self.unlimited && self.remaining == 0
    }
}

/// Render a statement into budget-truncated text.
pub fn render_statement(statement: &Statement, budget: &mut RenderBudget) -> String {
    let mut out = String::new();
    append_statement(&mut out, statement, budget);
    out
}

fn append_statement(out: &mut String, statement: &Statement, budget: &mut RenderBudget) {
    match statement {
        Statement::Simple { query } => budget.append(out, query.trim()),
        // bound values are rendered separately at the detail tier, never
        // inlined into the statement text
        Statement::Bound { query, .. } => budget.append(out, query.trim()),
        Statement::Batch { kind, members } => {
            budget.append(out, "BEGIN");
            match kind {
                BatchKind::Logged => {}
                BatchKind::Unlogged => budget.append(out, " UNLOGGED"),
                BatchKind::Counter => budget.append(out, " COUNTER"),
            }
            budget.append(out, " BATCH");
            for member in members {
                budget.append(out, " ");
                append_statement(out, member, budget);
            }
            budget.append(out, " APPLY BATCH");
        }
        Statement::Internal => budget.append(out, UNKNOWN_STATEMENT),
    }
    if !out.ends_with(';') {
        budget.append(out, ";");
    }
}

/// Render one bound value under its own, full budget.
///
/// NULL values render as the literal `NULL` regardless of the limit.
pub fn render_value(
    value: &BoundValue,
    formatter: &dyn ValueFormatter,
    limit: i32,
) -> Result<String, ObserverError> {
    if value.is_null() {
        return Ok("NULL".to_string());
    }
    let text = formatter.format(value)?;
    if limit != UNLIMITED && text.chars().count() > limit.max(0) as usize {
        let mut cut: String = text.chars().take(limit.max(0) as usize).collect();
        cut.push_str(TRUNCATED_OUTPUT);
        Ok(cut)
    } else {
        Ok(text)
    }
}
