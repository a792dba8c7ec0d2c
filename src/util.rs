pub mod body;
pub mod http_transport;

#[cfg(test)]
pub(crate) mod mock_transport;
