//! Fixture Tests: bridge end to end over a wallet fixture file
//!
//! These tests verify:
//! 1. Fixture files load from disk and missing/invalid files fail cleanly
//! 2. Bridge operations resolve per-DApp state through the fixture
//! 3. Redeem scripts written through the bridge are visible to later lookups

use bch_wallet_bridge::{
    BridgeConfig, ChangeType, FixtureProvider, NetworkType, TransactionOutput, WalletBridge, WalletFixture,
};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

const DAPP_ID: &str = "53212266f7994100e442f6dff10fbdb50a93121d25c196ce0597517d35d42e68";
const P2SH_ADDRESS: &str = "bitcoincash:pr9cc50sfdfwmnd5d9udevvvep4s7w6swcvltg3dmw";
const SIGN_ADDRESS: &str = "bitcoincash:qqk4zg334zpg9dpevnzz06rv2ffcwq96fctnutku5y";

fn fixture_json() -> serde_json::Value {
    json!({
        "receiveAddresses": [
            "bitcoincash:qqk4zg334zpg9dpevnzz06rv2ffcwq96fctnutku5y",
            "bitcoincash:qrsy0xwugcajsqa99c9nf05pz7ndckj55ctlsztu2p",
            "bitcoincash:qzg0esm3xr4gcq7u6vvgdwyjr4jwvl7seqrnjfzyc3"
        ],
        "changeAddresses": ["bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"],
        "wallet": {
            "receiveIndex": 1,
            "spendableUtxos": [{
                "txid": "10a879077602483f7e89cae7202c95119fc9ce53db55f33c7efe401703aa7c38",
                "outputIndex": 2,
                "address": "bitcoincash:qzg0esm3xr4gcq7u6vvgdwyjr4jwvl7seqrnjfzyc3",
                "script": "76a91447862fe165e6121af80d5dde1ecb478ed170565b88ac",
                "satoshis": 50000
            }]
        },
        "dapps": {
            DAPP_ID: {
                "receiveIndex": 2,
                "redeemScripts": ["9c1657fb5142ca85ab2d27ea847f648ec172a012"],
                "spendableUtxos": [{
                    "txid": "10a879077602483f7e89cae7202c95119fc9ce53db55f33c7efe401703aa7c38",
                    "outputIndex": 2,
                    "address": "bitcoincash:qzg0esm3xr4gcq7u6vvgdwyjr4jwvl7seqrnjfzyc3",
                    "script": "76a91447862fe165e6121af80d5dde1ecb478ed170565b88ac",
                    "satoshis": 50000
                }],
                "unspendableUtxos": [{
                    "txid": "115e8f72f39fad874cfab0deed11a80f24f967a84079fb56ddf53ea02e308986",
                    "outputIndex": 0,
                    "address": "bitcoincash:qrsy0xwugcajsqa99c9nf05pz7ndckj55ctlsztu2p",
                    "script": "047c039059b17576a914f9a93ce9b7ebed298597655065a96c2e0846db1788ac",
                    "satoshis": 20000
                }]
            }
        },
        "signatures": { SIGN_ADDRESS: "3045022100ab" },
        "signedTx": "0100000001abcdef",
        "networkMagic": 0x0B110907u32,
        "feePerByte": 2
    })
}

fn write_fixture(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    file.write_all(value.to_string().as_bytes()).expect("write");
    file
}

async fn load_bridge(config: BridgeConfig) -> (NamedTempFile, WalletBridge<FixtureProvider>) {
    let file = write_fixture(&fixture_json());
    let provider = FixtureProvider::load(file.path()).await.expect("load");
    (file, WalletBridge::from_config(provider, config).expect("bridge"))
}

#[tokio::test]
async fn load_reports_missing_and_invalid_files() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let missing = dir.path().join("absent.json");
    let err = FixtureProvider::load(&missing).await.err().expect("missing file");
    assert!(err.to_string().contains("absent.json"));

    let file = write_fixture(&json!("not a wallet"));
    assert!(FixtureProvider::load(file.path()).await.is_err());
}

#[tokio::test]
async fn empty_document_uses_defaults() {
    let file = write_fixture(&json!({}));
    let provider = FixtureProvider::load(file.path()).await.expect("load");
    assert_eq!(provider.snapshot().expect("snapshot"), WalletFixture::default());

    let bridge = WalletBridge::new(provider);
    assert_eq!(bridge.get_network().await.expect("network").name, NetworkType::Mainnet);
    assert_eq!(bridge.get_protocol_version().await.expect("version"), 70015);
    assert_eq!(bridge.get_balance(None).await.expect("balance"), 0);
}

#[tokio::test]
async fn addresses_follow_per_dapp_index() {
    let (_file, bridge) = load_bridge(BridgeConfig::new()).await;

    assert_eq!(bridge.get_address(ChangeType::Receive, None, None).await.expect("wallet"), "bitcoincash:qrsy0xwugcajsqa99c9nf05pz7ndckj55ctlsztu2p");
    assert_eq!(bridge.get_address(ChangeType::Receive, None, Some(DAPP_ID)).await.expect("dapp"), "bitcoincash:qzg0esm3xr4gcq7u6vvgdwyjr4jwvl7seqrnjfzyc3");
    assert_eq!(bridge.get_address(ChangeType::Change, Some(0), None).await.expect("change"), "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a");
    assert_eq!(bridge.get_address_index(ChangeType::Receive, Some(DAPP_ID)).await.expect("index"), 2);

    let all = bridge.get_addresses(ChangeType::Receive, Some(0), Some(3), None).await.expect("addresses");
    assert_eq!(all.len(), 3);

    // Past the end of the recorded addresses
    assert!(bridge.get_addresses(ChangeType::Receive, Some(2), Some(5), None).await.unwrap_err().is_provider());
}

#[tokio::test]
async fn balance_needs_explicit_dapp_id_for_unspendable_utxos() {
    let (_file, bridge) = load_bridge(BridgeConfig::new().with_default_dapp_id(DAPP_ID)).await;
    // The default id does not pull in the DApp's unspendable UTXOs
    assert_eq!(bridge.get_balance(None).await.expect("balance"), 50000);
    assert_eq!(bridge.get_utxos(None).await.expect("utxos").len(), 1);

    assert_eq!(bridge.get_balance(Some(DAPP_ID)).await.expect("balance"), 70000);
    let utxos = bridge.get_utxos(Some(DAPP_ID)).await.expect("utxos");
    assert_eq!(utxos[0].satoshis, 20000);
    assert_eq!(utxos[1].outpoint(), "10a879077602483f7e89cae7202c95119fc9ce53db55f33c7efe401703aa7c38:2");
}

#[tokio::test]
async fn added_redeem_script_becomes_resolvable() {
    let (_file, bridge) = load_bridge(BridgeConfig::new().with_sequential_utxo_queries()).await;

    assert_eq!(bridge.get_redeem_script(P2SH_ADDRESS, Some(DAPP_ID)).await.expect("before"), None);
    bridge.add_redeem_script("51519587", Some(DAPP_ID)).await.expect("add");
    bridge.add_redeem_script("51519587", Some(DAPP_ID)).await.expect("add twice");

    assert_eq!(bridge.get_redeem_script(P2SH_ADDRESS, Some(DAPP_ID)).await.expect("after").as_deref(), Some("51519587"));
    assert_eq!(bridge.get_redeem_scripts(Some(DAPP_ID)).await.expect("scripts").len(), 2);

    let snapshot = bridge.wallet_provider().expect("provider").snapshot().expect("snapshot");
    assert!(snapshot.wallet.redeem_scripts.is_empty());
}

#[tokio::test]
async fn signing_and_transactions() {
    let (_file, bridge) = load_bridge(BridgeConfig::new()).await;

    assert_eq!(bridge.sign(SIGN_ADDRESS, "48656c6c6f").await.expect("sign"), "3045022100ab");
    // Fixture has no key for this address
    assert!(bridge.sign(P2SH_ADDRESS, "48656c6c6f").await.unwrap_err().is_provider());

    let outputs = [TransactionOutput::new("76a91467b2e55ada06c869547e93288a4cf7377211f1f088ac", 40000)];
    assert_eq!(bridge.build_transaction(&outputs, None).await.expect("tx"), "0100000001abcdef");

    let too_much = [TransactionOutput::new("76a91467b2e55ada06c869547e93288a4cf7377211f1f088ac", 60000)];
    assert!(bridge.build_transaction(&too_much, None).await.unwrap_err().is_provider());
}

#[tokio::test]
async fn network_details() {
    let (_file, bridge) = load_bridge(BridgeConfig::new()).await;

    let network = bridge.get_network().await.expect("network");
    assert_eq!(network.name, NetworkType::Testnet3);
    assert_eq!(network.magic_hex(), "0b110907");
    assert_eq!(bridge.get_fee_per_byte().await.expect("fee"), 2);
}
