mod eval;
mod special_forms;

pub use eval::{apply, eval_value, Interpreter};
pub use special_forms::register as register_special_forms;
