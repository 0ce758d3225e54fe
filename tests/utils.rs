use std::net::{Ipv4Addr, TcpListener};

/// Binds a listener on an ephemeral port and keeps it open for the caller.
pub fn bind_listener() -> (TcpListener, u16) {
    let listener =
        TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).expect("Failed to bind a test listener");
    let port = listener
        .local_addr()
        .expect("Failed to read listener address")
        .port();
    (listener, port)
}

/// Returns a port that was free a moment ago.
pub fn free_port() -> u16 {
    let (listener, port) = bind_listener();
    drop(listener);
    port
}
