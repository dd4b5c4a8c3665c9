pub(crate) mod websocket;
