use netc::config::Config;
use netc::http::request::Request;
use netc::http::response::Response;
use netc::server::Server;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Binds a configured server on an ephemeral port and serves it in the
/// background. Returns the address to dial, the shutdown trigger, and the
/// serve task handle.
async fn start(
    server: Server,
) -> (SocketAddr, watch::Sender<bool>, JoinHandle<anyhow::Result<()>>) {
    let bound = server.bind().unwrap();
    let port = bound.local_addr().unwrap().port();
    let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(bound.serve(rx));

    (addr, tx, handle)
}

async fn send_raw(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

fn body_of(response: &[u8]) -> &[u8] {
    let pos = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    &response[pos + 4..]
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dispatch_to_registered_handler() {
    let mut server = Server::new(Config::new(0, 2));
    server
        .register("GET", "/", |_req: &Request, res: &mut Response| {
            res.set_body("Hello from NetC");
        })
        .unwrap();

    let (addr, tx, handle) = start(server).await;

    let response = send_raw(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let text = String::from_utf8_lossy(&response);

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Server: NetC\r\n"));
    assert!(text.contains("Connection: Close\r\n"));
    assert!(text.contains("Content-Length: 15\r\n"));
    assert_eq!(body_of(&response), b"Hello from NetC");

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_handler_sees_request_body_and_headers() {
    let mut server = Server::new(Config::new(0, 2));
    server
        .register("POST", "/echo", |req: &Request, res: &mut Response| {
            let body = req.body.as_deref().unwrap_or(b"").to_vec();
            res.add_header("X-Request-Host", req.header("Host").unwrap_or(""))
                .ok();
            res.set_body(body);
        })
        .unwrap();

    let (addr, tx, handle) = start(server).await;

    let response = send_raw(
        addr,
        b"POST /echo HTTP/1.1\r\nHost: unit.test\r\nContent-Length: 7\r\n\r\npayload",
    )
    .await;
    let text = String::from_utf8_lossy(&response);

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("X-Request-Host: unit.test\r\n"));
    assert_eq!(body_of(&response), b"payload");

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unrouted_request_gets_404() {
    let mut server = Server::new(Config::new(0, 2));
    server
        .register("GET", "/", |_req: &Request, _res: &mut Response| {})
        .unwrap();

    let (addr, tx, handle) = start(server).await;

    let response = send_raw(addr, b"GET /missing HTTP/1.1\r\nHost: x\r\n\r\n").await;
    let text = String::from_utf8_lossy(&response);

    assert!(text.starts_with("HTTP/1.1 404 Not found\r\n"));
    assert_eq!(body_of(&response), b"");

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_malformed_request_gets_400() {
    let server = Server::new(Config::new(0, 2));
    let (addr, tx, handle) = start(server).await;

    let response = send_raw(addr, b"garbage").await;
    let text = String::from_utf8_lossy(&response);

    assert!(text.starts_with("HTTP/1.1 400 Bad request\r\n"));
    assert_eq!(body_of(&response), b"");

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_duplicate_registration_dispatches_to_last_handler() {
    let mut server = Server::new(Config::new(0, 2));
    server
        .register("GET", "/", |_req: &Request, res: &mut Response| {
            res.set_body("first");
        })
        .unwrap();
    server
        .register("GET", "/", |_req: &Request, res: &mut Response| {
            res.set_body("second");
        })
        .unwrap();

    let (addr, tx, handle) = start(server).await;

    let response = send_raw(addr, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await;
    assert_eq!(body_of(&response), b"second");

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_body_on_exact_read_buffer_multiple() {
    // 8192 = 2 x the 4096-byte read chunk: without Content-Length-bounded
    // reading this body would stall on the short-read heuristic.
    let mut server = Server::new(Config::new(0, 2));
    server
        .register("POST", "/len", |req: &Request, res: &mut Response| {
            let n = req.body.as_deref().map(|b| b.len()).unwrap_or(0);
            res.set_body(n.to_string());
        })
        .unwrap();

    let (addr, tx, handle) = start(server).await;

    let body = vec![b'x'; 8192];
    let mut raw = format!(
        "POST /len HTTP/1.1\r\nHost: x\r\nContent-Length: {}\r\n\r\n",
        body.len()
    )
    .into_bytes();
    raw.extend_from_slice(&body);

    let response = send_raw(addr, &raw).await;
    assert_eq!(body_of(&response), b"8192");

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_more_connections_than_workers_all_serviced() {
    let mut server = Server::new(Config::new(0, 2));
    server
        .register("GET", "/", |_req: &Request, res: &mut Response| {
            res.set_body("ok");
        })
        .unwrap();

    let (addr, tx, handle) = start(server).await;

    let clients: Vec<_> = (0..8)
        .map(|_| {
            tokio::spawn(async move {
                send_raw(addr, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await
            })
        })
        .collect();

    for client in clients {
        let response = client.await.unwrap();
        // read_to_end returning proves the server closed the connection
        assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
        assert_eq!(body_of(&response), b"ok");
    }

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shutdown_drains_in_flight_connection() {
    let mut server = Server::new(Config::new(0, 2));
    server
        .register("POST", "/slow", |req: &Request, res: &mut Response| {
            let n = req.body.as_deref().map(|b| b.len()).unwrap_or(0);
            res.set_body(n.to_string());
        })
        .unwrap();

    let (addr, tx, handle) = start(server).await;

    // Open a connection and send only the header block; Content-Length
    // keeps the server reading, so the connection is in flight.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"POST /slow HTTP/1.1\r\nHost: x\r\nContent-Length: 4\r\n\r\n")
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    tx.send(true).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    // Draining: serve must wait for the in-flight connection
    assert!(!handle.is_finished());

    stream.write_all(b"body").await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    assert_eq!(body_of(&response), b"4");

    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_serve_stops_when_shutdown_sender_dropped() {
    let server = Server::new(Config::new(0, 2));
    let (_addr, tx, handle) = start(server).await;

    drop(tx);

    let result = tokio::time::timeout(std::time::Duration::from_secs(2), handle)
        .await
        .expect("serve did not stop after shutdown sender was dropped");
    result.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_new_connections_after_shutdown() {
    let server = Server::new(Config::new(0, 2));
    let (addr, tx, handle) = start(server).await;

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_servers_coexist() {
    let mut a = Server::new(Config::new(0, 1));
    a.register("GET", "/", |_req: &Request, res: &mut Response| {
        res.set_body("alpha");
    })
    .unwrap();

    let mut b = Server::new(Config::new(0, 1));
    b.register("GET", "/", |_req: &Request, res: &mut Response| {
        res.set_body("beta");
    })
    .unwrap();

    let (addr_a, tx_a, handle_a) = start(a).await;
    let (addr_b, tx_b, handle_b) = start(b).await;

    let ra = send_raw(addr_a, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await;
    let rb = send_raw(addr_b, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await;

    assert_eq!(body_of(&ra), b"alpha");
    assert_eq!(body_of(&rb), b"beta");

    tx_a.send(true).unwrap();
    tx_b.send(true).unwrap();
    handle_a.await.unwrap().unwrap();
    handle_b.await.unwrap().unwrap();
}
