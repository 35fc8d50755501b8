//! Remote access: the transport seam, its two implementations and the
//! fallback façade.

pub mod facade;
pub mod relay_client;
pub mod store_client;
pub mod transport;

#[cfg(test)]
pub mod testing;

pub use facade::RemoteFacade;
pub use relay_client::RelayClient;
pub use store_client::StoreClient;
pub use transport::RemoteTransport;
