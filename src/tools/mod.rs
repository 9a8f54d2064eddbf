//! Tool registry, dispatch, and the built-in tool set

mod builtins;
mod registry;

pub use builtins::register_builtins;
pub use registry::{
    DispatchErrorKind, ParamKind, ParamSpec, ToolDescriptor, ToolHandler, ToolRegistry,
    ToolResult, ToolSchema,
};
