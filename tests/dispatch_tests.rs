//! Chain resolution and dispatch through the public API.

mod common;

use common::{assert_error_contains, assert_ok, assert_same_shape, assert_state_error};
use serde_json::{json, Value};
use unimove::context::enter_chain_str;
use unimove::dispatch::PendingOperation;
use unimove::{
    enter_chain, scope_chain, ChainId, DispatchError, Dispatcher, NormalizedSdk, OperationCaller,
    Sui,
};

const SUI_TESTNET: &str = "https://fullnode.testnet.sui.io:443";
const IOTA_TESTNET: &str = "https://api.testnet.iota.cafe";

fn dispatcher() -> Dispatcher {
    Dispatcher::new().with_default_chain(Some(ChainId::Sui))
}

fn started(result: Result<PendingOperation, DispatchError>) -> PendingOperation {
    match result {
        Ok(pending) => pending,
        Err(e) => panic!("dispatch should start: {}", e),
    }
}

async fn data(pending: PendingOperation) -> Value {
    assert_ok(pending.await.into_result(), "operation")
}

#[tokio::test]
async fn test_explicit_chain_wins() {
    let pending = {
        let _ambient = enter_chain(ChainId::Sui);
        started(dispatcher().dispatch(
            "get_fullnode_url",
            Some(ChainId::Iota),
            vec![json!("testnet"), json!("sui")],
        ))
    };
    assert_eq!(data(pending).await, json!(IOTA_TESTNET));
}

#[tokio::test]
async fn test_trailing_chain_argument_beats_ambient() {
    let pending = {
        let _ambient = enter_chain(ChainId::Sui);
        started(dispatcher().dispatch(
            "get_fullnode_url",
            None,
            vec![json!("testnet"), json!("iota")],
        ))
    };
    assert_eq!(data(pending).await, json!(IOTA_TESTNET));
}

#[tokio::test]
async fn test_ambient_chain_applies() {
    let pending = {
        let _ambient = enter_chain(ChainId::Iota);
        started(dispatcher().dispatch("get_fullnode_url", None, vec![json!("testnet")]))
    };
    assert_eq!(data(pending).await, json!(IOTA_TESTNET));

    let pending = started(dispatcher().dispatch("get_fullnode_url", None, vec![json!("testnet")]));
    assert_eq!(data(pending).await, json!(SUI_TESTNET));
}

#[tokio::test]
async fn test_task_scope_selects_chain() {
    let url = scope_chain(ChainId::Iota, async {
        data(started(dispatcher().dispatch(
            "get_fullnode_url",
            None,
            vec![json!("testnet")],
        )))
        .await
    })
    .await;
    assert_eq!(url, json!(IOTA_TESTNET));
}

#[tokio::test]
async fn test_pending_operation_keeps_its_chain_after_switch() {
    let guard = enter_chain(ChainId::Sui);
    let pending = started(dispatcher().dispatch("get_fullnode_url", None, vec![json!("testnet")]));
    drop(guard);
    let other = enter_chain(ChainId::Iota);
    let state = pending.await;
    drop(other);

    assert_eq!(state.chain, ChainId::Sui);
    assert_eq!(state.into_result().unwrap(), json!(SUI_TESTNET));
}

#[test]
fn test_unresolved_chain_is_synchronous() {
    let err = Dispatcher::new()
        .with_default_chain(None)
        .dispatch("parse_struct_tag", None, vec![json!("0x2::coin::Coin")])
        .err()
        .expect("no chain to resolve");
    assert!(matches!(err, DispatchError::UnresolvedChain(_)));
    assert_error_contains(&err, "parse_struct_tag", "unresolved chain");
}

#[test]
fn test_string_chain_boundaries_are_exact() {
    for raw in ["Iota", "SUI", " iota"] {
        let err = dispatcher()
            .dispatch_on(raw, "get_fullnode_url", vec![json!("testnet")])
            .err()
            .expect("non-canonical chain id");
        assert!(matches!(err, DispatchError::Configuration(_)));
        assert!(enter_chain_str(raw).is_err());
    }
    let guard = enter_chain_str("iota").unwrap();
    assert_eq!(guard.chain(), ChainId::Iota);
}

#[test]
fn test_chain_specific_operations_are_unsupported_elsewhere() {
    for (operation, chain) in [("decode_jwt", ChainId::Iota), ("get_network", ChainId::Sui)] {
        let err = dispatcher()
            .dispatch(operation, Some(chain), vec![])
            .err()
            .expect("operation missing on chain");
        assert!(matches!(err, DispatchError::UnsupportedOperation(_)));
        assert_error_contains(&err, operation, "unsupported operation");
        assert_error_contains(&err, chain.as_str(), "unsupported operation");
    }
    assert!(dispatcher().operations(ChainId::Sui).contains(&"decode_jwt"));
    assert!(dispatcher().operations(ChainId::Iota).contains(&"get_network"));
}

#[test]
fn test_client_and_wallet_families_exist_on_both_chains() {
    for chain in ChainId::ALL {
        let operations = dispatcher().operations(chain);
        for name in [
            "client_query",
            "client_queries",
            "client_infinite_query",
            "client_mutation",
            "current_wallet",
            "wallets",
            "auto_connect_wallet",
            "sign_and_execute_transaction",
        ] {
            assert!(operations.contains(&name), "{} missing on {}", name, chain);
        }
    }
}

#[tokio::test]
async fn test_client_operations_reject_bad_arguments_before_sending() {
    let cases = [
        ("client_mutation", vec![json!("getObject")], "not a mutation"),
        ("client_queries", vec![json!({ "method": "getObject" })], "must be an array"),
        ("client_infinite_query", vec![json!("getObject"), json!([])], "not a paginated method"),
        ("client_query", vec![json!("getObject"), json!([]), json!("moonnet")], "moonnet"),
    ];
    for (operation, args, expected) in cases {
        let state = started(dispatcher().dispatch(operation, Some(ChainId::Iota), args)).await;
        assert_state_error(&state, expected);
    }
}

#[tokio::test]
async fn test_struct_tag_parses_identically_on_both_chains() {
    let tag = "0x2::coin::Coin<0x2::sui::SUI>";
    let caller = OperationCaller::with_dispatcher("parse_struct_tag", dispatcher());
    let on_sui = data(started(caller.call_on(ChainId::Sui, vec![json!(tag)]))).await;
    let on_iota = data(started(caller.call_on(ChainId::Iota, vec![json!(tag)]))).await;

    assert_eq!(on_sui, on_iota);
    assert_eq!(on_sui["address"], "0x2");
    assert_eq!(on_sui["module"], "coin");
    assert_eq!(on_sui["name"], "Coin");
    assert_eq!(on_sui["typeParams"][0]["struct"]["name"], "SUI");
}

#[tokio::test]
async fn test_iota_coin_tag_on_iota() {
    let pending = started(dispatcher().dispatch(
        "parse_struct_tag",
        None,
        vec![json!("0x2::coin::Coin<0x2::iota::IOTA>"), json!("iota")],
    ));
    let state = pending.await;
    assert_eq!(state.chain, ChainId::Iota);
    let tag = assert_ok(state.into_result(), "parse_struct_tag");
    assert_eq!(tag["address"], "0x2");
    assert_eq!(tag["module"], "coin");
    assert_eq!(tag["name"], "Coin");
    assert_eq!(
        tag["typeParams"][0],
        json!({ "struct": { "address": "0x2", "module": "iota", "name": "IOTA", "typeParams": [] } })
    );
}

#[tokio::test]
async fn test_normalize_struct_tag_shortens_addresses() {
    let padded = format!("0x{:0>64}::coin::Coin<0x{:0>64}::sui::SUI>", "2", "2");
    let caller = OperationCaller::with_dispatcher("normalize_struct_tag", dispatcher());
    let normalized = data(started(caller.call_on(ChainId::Sui, vec![json!(padded)]))).await;
    assert_eq!(normalized["address"], "0x2");
    assert_eq!(normalized["typeParams"][0]["struct"]["address"], "0x2");

    let sdk = NormalizedSdk::<Sui>::new();
    let tag = sdk.parse_struct_tag("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
    assert_eq!(
        sdk.normalize_struct_tag(&tag).to_canonical_string(),
        format!("0x{:0>64}::coin::Coin<0x{:0>64}::sui::SUI>", "2", "2")
    );
}

#[tokio::test]
async fn test_operation_results_have_the_same_shape_on_both_chains() {
    let generate = OperationCaller::with_dispatcher("generate_keypair", dispatcher());
    let on_sui = data(started(generate.call_on(ChainId::Sui, vec![]))).await;
    let on_iota = data(started(generate.call_on(ChainId::Iota, vec![]))).await;
    assert_same_shape(&on_sui, &on_iota, "generate_keypair");
    assert!(on_sui["secretKey"].as_str().unwrap().starts_with("suiprivkey"));
    assert!(on_iota["secretKey"].as_str().unwrap().starts_with("iotaprivkey"));
}

#[tokio::test]
async fn test_operation_failure_is_reported_in_state() {
    let state = started(dispatcher().dispatch(
        "decode_private_key",
        Some(ChainId::Sui),
        vec![json!("suiprivkey1notakey")],
    ))
    .await;
    assert_state_error(&state, "Invalid private key for Sui");
    assert_eq!(state.to_json()["isError"], true);
}

#[tokio::test]
async fn test_iota_network_table() {
    let caller = OperationCaller::with_dispatcher("get_network", dispatcher());
    let devnet = data(started(caller.call_on(ChainId::Iota, vec![json!("devnet")]))).await;
    assert_eq!(devnet["id"], "devnet");
    assert_eq!(devnet["url"], "https://api.devnet.iota.cafe");
}
