mod error;
mod hooks;
mod value;

pub use error::Error;
pub use hooks::{apply_callback, eval_callback, install_hooks, ApplyHook, EvalHook};
pub use lasso::Spur;
pub use value::{
    intern, mask, resolve, with_resolved, Env, Lambda, NativeProc, Pair, Promise, Signature, Value,
};
