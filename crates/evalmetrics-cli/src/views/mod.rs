pub mod archive;
pub mod report;

use std::io::IsTerminal;

/// Colors only when stdout is a terminal, so piped output stays plain.
pub(crate) fn use_color() -> bool {
    std::io::stdout().is_terminal()
}
