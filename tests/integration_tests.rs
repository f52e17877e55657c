mod common;

use std::sync::Arc;

use common::{credit, embedded_draft, history_item, init_logger, ScriptedTransport};
use jimeng_core::models::ModelResolver;
use jimeng_core::transport::{
  ASSET_LIST_PATH, CREDIT_RECEIVE_PATH, DRAFT_GENERATE_PATH,
  HISTORY_BY_IDS_PATH, USER_CREDIT_PATH,
};
use jimeng_core::{
  AssetListParams, ClientConfig, CredentialPool, Error, ErrorKind,
  GenerationRequest, ImageDescriptor, JimengClient,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

fn client_over(transport: Arc<ScriptedTransport>) -> JimengClient
{   JimengClient::new(&ClientConfig::default(), transport)
      .expect("default config is valid")
}

fn submitted(id: &str) -> common::Reply
{   Ok(Some(json!({ "aigc_data": { "history_record_id": id } })))
}

#[tokio::test]
async fn test_generate_unknown_alias_uses_defaults()
{   init_logger();
    let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(10))
        .always(DRAFT_GENERATE_PATH, submitted("hist-42"))
    );
    let client = client_over(transport.clone());

    let job = assert_ok!(
      client.generate(
        &GenerationRequest::new("unknown-alias", "a cat"),
        &CredentialPool::new(["tok1"])
      ).await
    );
    assert_eq!(job.job_id, "hist-42");
    assert_eq!(job.credential.expose(), "tok1");

    let drafts = transport.calls_to(DRAFT_GENERATE_PATH);
    assert_eq!(drafts.len(), 1);
    let body = &drafts[0].request.body;
    let default_id = ModelResolver::resolve("jimeng-3.0");
    assert_eq!(body["extend"]["root_model"], default_id);

    let draft = embedded_draft(&drafts[0]);
    let core = &draft["component_list"][0]["abilities"]["generate"]["core_param"];
    assert_eq!(core["model"], default_id);
    assert_eq!(core["prompt"], "a cat");
    assert_eq!(core["negative_prompt"], "");
    assert_eq!(core["sample_strength"], 0.5);
    assert_eq!(core["large_image_info"]["width"], 2048);
    assert_eq!(core["large_image_info"]["height"], 2048);
    assert_eq!(drafts[0].credential.expose(), "tok1");
}

#[tokio::test]
async fn test_generate_passes_caller_overrides()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(10))
        .always(DRAFT_GENERATE_PATH, submitted("hist-7"))
    );
    let client = client_over(transport.clone());
    let request = GenerationRequest::new("jimeng-2.1", "a dog")
      .with_size(1024, 768)
      .with_sample_strength(0.8)
      .with_negative_prompt("blurry");

    assert_ok!(client.generate(&request, &CredentialPool::new(["tok1"])).await);

    let draft = embedded_draft(&transport.calls_to(DRAFT_GENERATE_PATH)[0]);
    let core = &draft["component_list"][0]["abilities"]["generate"]["core_param"];
    assert_eq!(core["model"], "high_aes_general_v21_L:general_v2.1_L");
    assert_eq!(core["negative_prompt"], "blurry");
    assert_eq!(core["sample_strength"], 0.8);
    assert_eq!(core["large_image_info"]["width"], 1024);
    assert_eq!(core["large_image_info"]["height"], 768);
}

#[tokio::test]
async fn test_generate_tops_up_when_out_of_credit()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(0))
        .always(CREDIT_RECEIVE_PATH, Ok(Some(json!({ "cur_total_credits": 66 }))))
        .always(DRAFT_GENERATE_PATH, submitted("hist-1"))
    );
    let client = client_over(transport.clone());

    assert_ok!(
      client.generate(
        &GenerationRequest::new("jimeng-3.0", "a cat"),
        &CredentialPool::new(["tok1"])
      ).await
    );

    let paths: Vec<_> = transport.calls()
      .iter()
      .map(|c| c.request.path)
      .collect();
    assert_eq!(
      paths,
      vec![USER_CREDIT_PATH, CREDIT_RECEIVE_PATH, DRAFT_GENERATE_PATH]
    );
}

#[tokio::test]
async fn test_generate_skips_top_up_with_credit()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(5))
        .always(DRAFT_GENERATE_PATH, submitted("hist-1"))
    );
    let client = client_over(transport.clone());

    assert_ok!(
      client.generate(
        &GenerationRequest::new("jimeng-3.0", "a cat"),
        &CredentialPool::new(["tok1"])
      ).await
    );
    assert!(transport.calls_to(CREDIT_RECEIVE_PATH).is_empty());
}

#[tokio::test]
async fn test_failed_top_up_does_not_abort_submission()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(0))
        .always(CREDIT_RECEIVE_PATH, Err(Error::Http("connection reset".into())))
        .always(DRAFT_GENERATE_PATH, submitted("hist-9"))
    );
    let client = client_over(transport.clone());

    let job = assert_ok!(
      client.generate(
        &GenerationRequest::new("jimeng-3.0", "a cat"),
        &CredentialPool::new(["tok1"])
      ).await
    );
    assert_eq!(job.job_id, "hist-9");
}

#[tokio::test]
async fn test_failed_top_up_aborts_when_configured()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(0))
        .always(CREDIT_RECEIVE_PATH, Err(Error::Http("connection reset".into())))
        .always(DRAFT_GENERATE_PATH, submitted("hist-9"))
    );
    let config = ClientConfig::default().with_abort_on_failed_top_up(true);
    let client = JimengClient::new(&config, transport.clone()).unwrap();

    let err = assert_err!(
      client.generate(
        &GenerationRequest::new("jimeng-3.0", "a cat"),
        &CredentialPool::new(["tok1"])
      ).await
    );
    assert_eq!(err.kind(), ErrorKind::InsufficientCredit);
    assert!(transport.calls_to(DRAFT_GENERATE_PATH).is_empty());
}

#[tokio::test]
async fn test_missing_history_id_is_job_id_missing()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(1))
        .always(DRAFT_GENERATE_PATH, Ok(Some(json!({ "aigc_data": {} }))))
    );
    let client = client_over(transport.clone());

    let err = assert_err!(
      client.generate(
        &GenerationRequest::new("jimeng-3.0", "a cat"),
        &CredentialPool::new(["tok1"])
      ).await
    );
    assert_eq!(err.kind(), ErrorKind::JobIdMissing);
    // submissions are never retried
    assert_eq!(transport.calls_to(DRAFT_GENERATE_PATH).len(), 1);
}

#[tokio::test]
async fn test_empty_history_id_is_job_id_missing()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(1))
        .always(DRAFT_GENERATE_PATH, submitted(""))
    );
    let client = client_over(transport);

    let err = assert_err!(
      client.generate(
        &GenerationRequest::new("jimeng-3.0", "a cat"),
        &CredentialPool::new(["tok1"])
      ).await
    );
    assert!(matches!(err, Error::JobIdMissing(_)));
}

#[tokio::test]
async fn test_submission_transport_error_is_not_retried()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(1))
        .always(DRAFT_GENERATE_PATH, Err(Error::Http("timed out".into())))
    );
    let client = client_over(transport.clone());

    let err = assert_err!(
      client.generate(
        &GenerationRequest::new("jimeng-3.0", "a cat"),
        &CredentialPool::new(["tok1"])
      ).await
    );
    assert_eq!(err, Error::Http("timed out".into()));
    assert_eq!(transport.calls_to(DRAFT_GENERATE_PATH).len(), 1);
}

#[tokio::test]
async fn test_generate_with_empty_pool_fails()
{   let transport = Arc::new(ScriptedTransport::new());
    let client = client_over(transport.clone());

    let err = assert_err!(
      client.generate(
        &GenerationRequest::new("jimeng-3.0", "a cat"),
        &CredentialPool::from_authorization("Bearer ")
      ).await
    );
    assert_eq!(err, Error::CredentialExhausted);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_fetch_result_projects_items()
{   init_logger();
    let transport = Arc::new(
      ScriptedTransport::new().always(HISTORY_BY_IDS_PATH, Ok(Some(json!({
        "job-1": { "item_list": [ history_item("X", "Y", "Z", "W") ] }
      }))))
    );
    let client = client_over(transport.clone());

    let result = assert_ok!(
      client.fetch_result("job-1", &CredentialPool::new(["tok1"])).await
    );
    assert_eq!(
      result.images,
      vec![ImageDescriptor
      {   webp: "Y".into()
        , cover: "Z".into()
        , png: "X".into()
        , large: "W".into()
      }]
    );

    let calls = transport.calls_to(HISTORY_BY_IDS_PATH);
    assert_eq!(calls.len(), 1);
    let body = &calls[0].request.body;
    assert_eq!(body["history_ids"], json!(["job-1"]));
    assert_eq!(body["image_info"]["format"], "webp");
    assert_eq!(body["image_info"]["image_scene_list"][0]["uniq_key"], "2400");
}

#[tokio::test]
async fn test_round_trip_generate_then_fetch()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(USER_CREDIT_PATH, credit(3))
        .always(DRAFT_GENERATE_PATH, submitted("hist-77"))
        .always(HISTORY_BY_IDS_PATH, Ok(Some(json!({
          "hist-77": { "item_list": [
            history_item("a.png", "a.webp", "a-1080.webp", "a-large.png"),
            history_item("b.png", "b.webp", "b-1080.webp", "b-large.png"),
          ] }
        }))))
    );
    let client = client_over(transport);
    let pool = CredentialPool::new(["tok1", "tok2"]);

    let job = assert_ok!(
      client.generate(&GenerationRequest::new("jimeng-4.0", "a cat"), &pool).await
    );
    let result = assert_ok!(client.fetch_result(&job.job_id, &pool).await);

    let larges: Vec<_> = result.images.iter().map(|i| i.large.as_str()).collect();
    assert_eq!(larges, vec!["a-large.png", "b-large.png"]);
}

#[tokio::test]
async fn test_fetch_asset_list_passes_records_through()
{   let transport = Arc::new(
      ScriptedTransport::new().always(ASSET_LIST_PATH, Ok(Some(json!({
        "asset_list": [ { "id": "a1", "anything": [1, 2] }, { "id": "a2" } ],
        "total": 2
      }))))
    );
    let client = client_over(transport.clone());

    let result = assert_ok!(
      client.fetch_asset_list(
        &CredentialPool::new(["tok1"]),
        &AssetListParams::default()
      ).await
    );
    assert_eq!(result.total, 2);
    assert_eq!(result.assets[0], json!({ "id": "a1", "anything": [1, 2] }));

    let body = &transport.calls_to(ASSET_LIST_PATH)[0].request.body;
    assert_eq!(body["count"], 20);
    assert_eq!(body["direction"], 1);
    assert_eq!(body["mode"], "workbench");
    assert_eq!(body["asset_type_list"], json!([1, 2, 5, 6, 7, 8, 9]));
    assert_eq!(body["option"]["only_favorited"], false);
    assert_eq!(body["option"]["origin_image_info"]["width"], 96);
}

#[tokio::test]
async fn test_fetch_asset_list_applies_filters()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(ASSET_LIST_PATH, Ok(Some(json!({}))))
    );
    let client = client_over(transport.clone());
    let params: AssetListParams = serde_json::from_value(json!({
      "count": 5,
      "direction": 2,
      "mode": "canvas",
      "option": { "order_by": 1, "only_favorited": true },
      "asset_type_list": [1]
    })).unwrap();

    let result = assert_ok!(
      client.fetch_asset_list(&CredentialPool::new(["tok1"]), &params).await
    );
    assert!(result.assets.is_empty());
    assert_eq!(result.total, 0);

    let body = &transport.calls_to(ASSET_LIST_PATH)[0].request.body;
    assert_eq!(body["count"], 5);
    assert_eq!(body["direction"], 2);
    assert_eq!(body["mode"], "canvas");
    assert_eq!(body["option"]["order_by"], 1);
    assert_eq!(body["option"]["only_favorited"], true);
    assert_eq!(body["option"]["end_time_stamp"], 0);
    assert_eq!(body["asset_type_list"], json!([1]));
}

#[tokio::test(start_paused = true)]
async fn test_fetch_asset_list_retries_empty_body()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .script(ASSET_LIST_PATH, vec![Ok(None), Ok(Some(json!(false)))])
        .always(ASSET_LIST_PATH, Ok(Some(json!({ "asset_list": [], "total": 0 }))))
    );
    let client = client_over(transport.clone());

    assert_ok!(
      client.fetch_asset_list(
        &CredentialPool::new(["tok1"]),
        &AssetListParams::default()
      ).await
    );
    assert_eq!(transport.calls_to(ASSET_LIST_PATH).len(), 3);
}

#[tokio::test]
async fn test_fetch_asset_list_rejects_non_object()
{   let transport = Arc::new(
      ScriptedTransport::new()
        .always(ASSET_LIST_PATH, Ok(Some(json!("<html>"))))
    );
    let client = client_over(transport.clone());

    let err = assert_err!(
      client.fetch_asset_list(
        &CredentialPool::new(["tok1"]),
        &AssetListParams::default()
      ).await
    );
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert_eq!(transport.calls_to(ASSET_LIST_PATH).len(), 1);
}

#[test]
fn test_invalid_config_is_rejected()
{   let transport = Arc::new(ScriptedTransport::new());
    let config = ClientConfig::default().with_retry(0, 2000);
    let err = JimengClient::new(&config, transport).err();
    assert!(matches!(err, Some(Error::InvalidConfiguration(_))));
}
