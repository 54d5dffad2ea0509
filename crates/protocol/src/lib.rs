//! JSON-RPC 2.0 wire types and the request dispatcher shared by the
//! gateway's HTTP surface and the MCP upstream client.

pub mod dispatcher;
pub mod jsonrpc;

pub use dispatcher::{Dispatcher, InvokeError, ToolCatalog, ToolInvoker};
pub use jsonrpc::{
    ErrorCode, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
};
