use std::process::ExitCode;

use sidebar_hook::{HookKind, main_for};

fn main() -> ExitCode {
    main_for(HookKind::WrapSection)
}
