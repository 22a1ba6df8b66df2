//! JSON-RPC server launcher.

use crate::{EthApiServer, EthRpc};
use jsonrpsee::server::{Server, ServerHandle};
use mockchain_core::ChainFacade;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

/// Launches the JSON-RPC server on the given socket, serving the `eth`
/// namespace over the facade. Returns the bound address and the handle
/// keeping the server alive.
pub async fn launch(
    socket: SocketAddr,
    facade: Arc<dyn ChainFacade>,
) -> std::io::Result<(SocketAddr, ServerHandle)> {
    let server = Server::builder().build(socket).await?;
    let addr = server.local_addr()?;
    let handle = server.start(EthRpc::new(facade).into_rpc());
    info!(%addr, "rpc server listening");
    Ok((addr, handle))
}
