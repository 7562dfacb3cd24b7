use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_key, DEMO_API_KEY, DEMO_PASSWORD, DEMO_USERNAME, DEMO_USER_HASH};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn form_request(route: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v3.asmx/{route}"))
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body.to_string())
        .unwrap()
}

fn with_key(body: &str) -> String {
    if body.is_empty() {
        format!("apiKey={DEMO_API_KEY}")
    } else {
        format!("{body}&apiKey={DEMO_API_KEY}")
    }
}

// --- envelope ---

#[tokio::test]
async fn check_key_succeeds_with_known_key() {
    let resp = app()
        .oneshot(form_request("checkKey", &with_key("")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn wrong_key_is_an_error_envelope_with_200() {
    let resp = app_with_key("other-key")
        .oneshot(form_request("checkKey", &with_key("")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid apiKey");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app()
        .oneshot(form_request("getEverything", &with_key("")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- login ---

#[tokio::test]
async fn login_returns_user_hash() {
    let body = with_key(&format!(
        "username={DEMO_USERNAME}&password={DEMO_PASSWORD}"
    ));
    let resp = app().oneshot(form_request("login", &body)).await.unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["hash"], DEMO_USER_HASH);
}

#[tokio::test]
async fn check_user_hash_rejects_unknown_hash() {
    let resp = app()
        .oneshot(form_request("checkUserHash", &with_key("userHash=nope")))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid userHash");
}

// --- catalog ---

#[tokio::test]
async fn get_sets_filters_by_comma_joined_theme() {
    // params={"theme":"Star Wars","pageSize":1}
    let body = with_key(
        "params=%7B%22theme%22%3A%22Star%20Wars%22%2C%22pageSize%22%3A1%7D&userHash=",
    );
    let resp = app().oneshot(form_request("getSets", &body)).await.unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["matches"], 2);
    assert_eq!(body["sets"].as_array().unwrap().len(), 1);
    assert_eq!(body["sets"][0]["theme"], "Star Wars");
}

#[tokio::test]
async fn get_sets_page_far_past_the_end_is_empty() {
    // params={"pageSize":999,"pageNumber":9223372036854775807}
    let body = with_key(
        "params=%7B%22pageSize%22%3A999%2C%22pageNumber%22%3A9223372036854775807%7D&userHash=",
    );
    let resp = app().oneshot(form_request("getSets", &body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["matches"], 3);
    assert!(body["sets"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn get_sets_rejects_invalid_params_json() {
    let body = with_key("params=not-json&userHash=");
    let resp = app().oneshot(form_request("getSets", &body)).await.unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid params");
}

#[tokio::test]
async fn get_subthemes_reads_capitalised_theme_field() {
    let body = with_key("Theme=Star%20Wars");
    let resp = app()
        .oneshot(form_request("getSubthemes", &body))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["matches"], 2);
    assert_eq!(body["subthemes"][0]["subtheme"], "Episode IV");
}

#[tokio::test]
async fn get_reviews_for_unknown_set_is_an_error() {
    let resp = app()
        .oneshot(form_request("getReviews", &with_key("setID=1")))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["status"], "error");
}

// --- collection lifecycle ---

#[tokio::test]
async fn collection_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // own two copies of the Bookshop, with a note
    // params={"own":1,"want":0,"qtyOwned":2,"notes":"mint"}
    let body = with_key(&format!(
        "params=%7B%22own%22%3A1%2C%22want%22%3A0%2C%22qtyOwned%22%3A2%2C%22notes%22%3A%22mint%22%7D&setID=29813&userHash={DEMO_USER_HASH}"
    ));
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request("setCollection", &body))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["status"], "success");

    // owned sets now include it
    // params={"owned":1}
    let body = with_key(&format!(
        "params=%7B%22owned%22%3A1%7D&userHash={DEMO_USER_HASH}"
    ));
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request("getSets", &body))
        .await
        .unwrap();
    let sets = body_json(resp).await;
    assert_eq!(sets["matches"], 1);
    assert_eq!(sets["sets"][0]["setID"], 29813);
    assert_eq!(sets["sets"][0]["collection"]["qtyOwned"], 2);

    // and the note is listed
    let body = with_key(&format!("userHash={DEMO_USER_HASH}"));
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request("getUserNotes", &body))
        .await
        .unwrap();
    let notes = body_json(resp).await;
    assert_eq!(notes["userNotes"][0]["setID"], 29813);
    assert_eq!(notes["userNotes"][0]["notes"], "mint");

    // getSets calls are counted against the key
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request("getKeyUsageStats", &with_key("")))
        .await
        .unwrap();
    let usage = body_json(resp).await;
    assert_eq!(usage["apiKeyUsage"][0]["count"], 1);
}
