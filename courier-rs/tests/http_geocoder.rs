//! HTTP geocoder against a local hyper server.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use courier_rs::geo::{AddressValidator, GeoError, GeoObjectProvider, HttpGeoProvider};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use tokio::net::TcpListener;

const FOUND: &str = r#"{"response":{"GeoObjectCollection":{"featureMember":[
    {"GeoObject":{"name":"Baker Street, 221B","description":"London","Point":{"pos":"-0.158541 51.523767"}}}
]}}}"#;
const EMPTY: &str = r#"{"response":{"GeoObjectCollection":{"featureMember":[]}}}"#;

async fn geocode(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let query = req.uri().query().unwrap_or_default().to_owned();
    let (status, body) = if !query.contains("apikey=secret") {
        (StatusCode::FORBIDDEN, "{}")
    } else if query.contains("geocode=221B%20Baker%20Street") {
        (StatusCode::OK, FOUND)
    } else if query.contains("geocode=slow") {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (StatusCode::OK, EMPTY)
    } else if query.contains("geocode=broken") {
        (StatusCode::BAD_GATEWAY, "upstream down")
    } else {
        (StatusCode::OK, EMPTY)
    };
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    Ok(response)
}

async fn serve() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service_fn(geocode))
                    .await;
            });
        }
    });
    addr
}

fn provider(addr: SocketAddr) -> HttpGeoProvider {
    HttpGeoProvider::new(format!("http://{}/1.x/", addr)).api_key("secret")
}

#[tokio::test]
async fn found_address_is_decoded() {
    let addr = serve().await;
    let object = provider(addr)
        .find_geo_object("221B Baker Street")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(object.name, "Baker Street, 221B");
    assert!(object.point.is_some());
}

#[tokio::test]
async fn empty_collection_is_not_found() {
    let addr = serve().await;
    assert!(provider(addr)
        .find_geo_object("zzzzz-not-a-place")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn error_status_is_an_upstream_failure() {
    let addr = serve().await;
    let err = provider(addr).find_geo_object("broken").await.unwrap_err();
    assert!(matches!(err, GeoError::Status(502)));

    let no_key = HttpGeoProvider::new(format!("http://{}/1.x/", addr));
    let err = no_key.find_geo_object("221B Baker Street").await.unwrap_err();
    assert!(matches!(err, GeoError::Status(403)));
}

#[tokio::test]
async fn validator_times_out_a_slow_geocoder() {
    let addr = serve().await;
    let validator =
        AddressValidator::new(Arc::new(provider(addr))).with_timeout(Duration::from_millis(100));
    assert!(matches!(
        validator.validate("slow").await,
        Err(GeoError::Timeout(_))
    ));
    assert!(validator.validate("221B Baker Street").await.unwrap());
}

#[tokio::test]
async fn unreachable_geocoder_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = provider(addr).find_geo_object("anything").await.unwrap_err();
    assert!(matches!(err, GeoError::Transport(_)));
}

#[tokio::test]
async fn oversized_response_is_rejected() {
    let addr = serve().await;
    let err = provider(addr)
        .max_response_bytes(32)
        .find_geo_object("221B Baker Street")
        .await
        .unwrap_err();
    assert!(matches!(err, GeoError::InvalidResponse(_)));

    let object = provider(addr)
        .max_response_bytes(FOUND.len())
        .find_geo_object("221B Baker Street")
        .await
        .unwrap();
    assert!(object.is_some());
}
