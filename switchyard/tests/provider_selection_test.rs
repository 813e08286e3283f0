//! Provider lookup and the process-wide singletons.

use std::sync::{Arc, Mutex};

use switchyard::prelude::*;
use switchyard::{client_for, reset_clients};

// Tests in this file share the global registry.
static REGISTRY_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn test_selector_returns_the_singleton() {
    let _lock = REGISTRY_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let selected = get_client("reqwest").unwrap();
    let reqwest = selected.as_reqwest().unwrap();
    assert!(Arc::ptr_eq(reqwest, &ReqwestClient::instance()));

    let again = get_client("REQWEST").unwrap();
    assert!(Arc::ptr_eq(reqwest, again.as_reqwest().unwrap()));
}

#[test]
fn test_every_provider_name_resolves() {
    let _lock = REGISTRY_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    for (name, kind) in [
        ("hyper", ProviderKind::Hyper),
        ("reqwest", ProviderKind::Reqwest),
        ("ureq", ProviderKind::Ureq),
        ("tower", ProviderKind::Tower),
    ] {
        assert_eq!(get_client(name).unwrap().kind(), kind);
    }
}

#[test]
fn test_unknown_provider_fails() {
    let err = get_client("superagent").unwrap_err();
    assert_eq!(err, HttpError::UnsupportedProvider("superagent".into()));
}

#[test]
fn test_reset_builds_fresh_clients() {
    let _lock = REGISTRY_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let before = HyperClient::instance();
    before.register_request_interceptors([map_request(|url: String, options: FetchOptions| {
        Ok(Intercepted::new(url, options))
    })]);
    assert_eq!(before.pipeline().request_interceptor_count(), 1);

    reset_clients();

    let after = client_for(ProviderKind::Hyper);
    let after = after.as_hyper().unwrap();
    assert!(!Arc::ptr_eq(&before, after));
    assert_eq!(after.pipeline().request_interceptor_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access_yields_one_instance() {
    let _lock = REGISTRY_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    reset_clients();

    let handles: Vec<_> = (0..8)
        .map(|_| tokio::spawn(async { UreqClient::instance() }))
        .collect();
    let clients: Vec<Arc<UreqClient>> = futures::future::try_join_all(handles).await.unwrap();

    assert!(clients.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}
