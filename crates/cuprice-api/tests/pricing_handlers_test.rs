//! Integration tests for pricing API handlers
//!
//! Handlers are exercised through the actix test service against an
//! in-memory project source.

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use cuprice_api::{configure_health, configure_pricing, PricingState};
    use cuprice_client::InMemoryProjectSource;
    use cuprice_core::models::{CustomPlanSubscription, Plan, Project};
    use cuprice_core::traits::PricingHooks;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::str::FromStr;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl RecordingHooks {
        fn events(&self) -> Vec<String> {
            self.events.lock().clone()
        }
    }

    impl PricingHooks for RecordingHooks {
        fn on_plan_select(&self, plan: &Plan) {
            self.events.lock().push(format!("select:{}", plan.name));
        }

        fn on_custom_plan_open(&self) {
            self.events.lock().push("open".to_string());
        }

        fn on_custom_plan_subscribe(&self, subscription: &CustomPlanSubscription) {
            self.events
                .lock()
                .push(format!("subscribe:{}", subscription.features.join(",")));
        }
    }

    fn sample_project() -> Project {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Acme Cloud",
            "description": "Pay for what you use",
            "currency": "USD",
            "annualDiscount": 0.2,
            "annualDiscountEnabled": true,
            "monthGroupDiscounts": { "3": 0.1, "6": 0.15 },
            "features": [
                { "id": 1, "name": "SSO", "featureType": "Standard", "basePrice": 10 },
                {
                    "id": 2,
                    "name": "Storage",
                    "featureType": "Limits",
                    "countableData": { "usageCount": 5, "condition": "GB", "countPrice": 2 }
                },
                {
                    "id": 3,
                    "name": "API",
                    "featureType": "Usage Based",
                    "countableData": {
                        "usageCount": 0,
                        "condition": "call",
                        "countPrice": 0.01,
                        "eventAggregationMethod": "sum"
                    }
                }
            ],
            "pricingPlans": [
                { "id": 1, "name": "Pro", "order": 1, "isVisible": true, "basePrice": 100, "planFeatures": [] },
                { "id": 2, "name": "Legacy", "order": 2, "isVisible": false, "basePrice": 5, "planFeatures": [] }
            ]
        }))
        .unwrap()
    }

    fn state(hooks: Arc<RecordingHooks>) -> PricingState {
        let source = InMemoryProjectSource::new().with_project("acme", sample_project());
        PricingState::new(Arc::new(source), hooks)
            .with_allowed_api_urls(["https://pricing.example.com/"])
    }

    macro_rules! app {
        ($hooks:expr) => {
            test::init_service(
                App::new().app_data(web::Data::new(state($hooks))).service(
                    web::scope("/api/v1")
                        .configure(configure_health)
                        .configure(configure_pricing),
                ),
            )
            .await
        };
    }

    fn decimal(value: &Value) -> Decimal {
        match value {
            Value::String(s) => Decimal::from_str(s).unwrap(),
            other => Decimal::from_str(&other.to_string()).unwrap(),
        }
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
    }

    #[actix_web::test]
    async fn test_pricing_page() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::get()
            .uri("/api/v1/pricing/acme?annual=true")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let data = &body["data"];
        assert_eq!(data["header"]["title"], "Acme Cloud");
        assert_eq!(data["currencySymbol"], "$");
        assert_eq!(data["annualToggle"]["isAnnual"], true);
        assert_eq!(data["annualToggle"]["label"], "Annual (SAVE 20%)");

        let plans = data["plans"].as_array().unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0]["title"], "Pro");
        assert_eq!(plans[0]["period"], "year");

        let labels: Vec<&str> = data["durationOptions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["label"].as_str().unwrap())
            .collect();
        assert_eq!(
            labels,
            vec!["Monthly", "3 Months (10%)", "6 Months (15%)", "12 Months (20%)"]
        );
        assert_eq!(data["seatOptions"], json!([1, 5, 10, 25, 50, 100]));
        assert_eq!(data["features"].as_array().unwrap().len(), 3);
        assert!(data["cssVariables"]["--base-primary"].is_string());
    }

    #[actix_web::test]
    async fn test_pricing_page_category_filter() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::get()
            .uri("/api/v1/pricing/acme?category=Countable")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let names: Vec<&str> = body["data"]["features"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Storage", "API"]);
    }

    #[actix_web::test]
    async fn test_unknown_project_is_not_found() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::get().uri("/api/v1/pricing/missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "project_not_found");
    }

    #[actix_web::test]
    async fn test_invalid_api_url_rejected() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::get()
            .uri("/api/v1/pricing/acme?api_url=nope")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_api_url_outside_allowlist_rejected() {
        let app = app!(Arc::new(RecordingHooks::default()));

        for uri in [
            "/api/v1/pricing/acme?api_url=http://169.254.169.254",
            "/api/v1/pricing/acme/plans/1/select?api_url=http://10.0.0.1:8080",
        ] {
            let req = if uri.contains("/select") {
                test::TestRequest::post().uri(uri).to_request()
            } else {
                test::TestRequest::get().uri(uri).to_request()
            };
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "validation_error");
        }

        let req = test::TestRequest::post()
            .uri("/api/v1/pricing/acme/quote?api_url=http://127.0.0.1:6379")
            .set_json(json!({ "features": ["SSO"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_allowlisted_api_url_accepted() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::get()
            .uri("/api/v1/pricing/acme?api_url=https://Pricing.example.com")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_quote_custom_plan() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::post()
            .uri("/api/v1/pricing/acme/quote")
            .set_json(json!({
                "features": ["SSO", "Storage"],
                "seats": 5,
                "duration": "6months"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let quote = &body["data"]["quote"];
        assert_eq!(quote["duration"], "6months");
        assert_eq!(quote["months"], 6);
        assert_eq!(decimal(&quote["baseMonthlyTotal"]), dec!(100));
        assert_eq!(decimal(&quote["totalBeforeDiscount"]), dec!(600));
        assert_eq!(decimal(&quote["discountAmount"]), dec!(90));
        assert_eq!(decimal(&quote["total"]), dec!(510));
        assert_eq!(body["data"]["canSubscribe"], true);
        assert_eq!(body["data"]["lines"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_quote_usage_amount_input() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::post()
            .uri("/api/v1/pricing/acme/quote")
            .set_json(json!({
                "features": ["API", "Storage"],
                "usageAmounts": { "API": "1000", "Storage": 10 }
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        // 1000 * 0.01 + 10 * 2
        assert_eq!(decimal(&body["data"]["quote"]["total"]), dec!(30));
    }

    #[actix_web::test]
    async fn test_unavailable_duration_falls_back_to_month() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::post()
            .uri("/api/v1/pricing/acme/quote")
            .set_json(json!({ "features": ["SSO"], "duration": "9months" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let quote = &body["data"]["quote"];
        assert_eq!(quote["duration"], "month");
        assert_eq!(quote["months"], 1);
        assert_eq!(decimal(&quote["total"]), dec!(10));
    }

    #[actix_web::test]
    async fn test_quote_rejects_bad_selection() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let cases = [
            (json!({ "features": ["SSO"], "seats": 3 }), "invalid_seat_count"),
            (json!({ "features": ["SSO"], "duration": "fortnight" }), "invalid_duration"),
            (json!({ "features": ["Telepathy"] }), "unknown_feature"),
            (
                json!({ "features": ["API"], "usageAmounts": { "API": "12abc" } }),
                "invalid_input",
            ),
        ];

        for (payload, code) in cases {
            let req = test::TestRequest::post()
                .uri("/api/v1/pricing/acme/quote")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], code);
        }
    }

    #[actix_web::test]
    async fn test_quote_amount_beyond_decimal_range() {
        let app = app!(Arc::new(RecordingHooks::default()));

        let req = test::TestRequest::post()
            .uri("/api/v1/pricing/acme/quote")
            .set_json(json!({
                "features": ["Storage"],
                "usageAmounts": { "Storage": "79228162514264337593543950335" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid_input");
    }

    #[actix_web::test]
    async fn test_subscribe_custom_plan() {
        let hooks = Arc::new(RecordingHooks::default());
        let app = app!(hooks.clone());

        let req = test::TestRequest::post()
            .uri("/api/v1/pricing/acme/subscribe")
            .set_json(json!({ "features": ["SSO", "Storage"], "seats": 10 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let subscription = &body["data"]["subscription"];
        assert_eq!(subscription["features"], json!(["SSO", "Storage"]));
        assert_eq!(subscription["seats"], 10);
        assert_eq!(subscription["duration"], "month");
        assert_eq!(decimal(&subscription["usageAmounts"]["Storage"]), dec!(5));
        assert_eq!(body["message"], "Custom plan subscribed");

        assert_eq!(hooks.events(), vec!["open", "subscribe:SSO,Storage"]);
    }

    #[actix_web::test]
    async fn test_subscribe_empty_selection() {
        let hooks = Arc::new(RecordingHooks::default());
        let app = app!(hooks.clone());

        let req = test::TestRequest::post()
            .uri("/api/v1/pricing/acme/subscribe")
            .set_json(json!({ "features": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(hooks.events(), vec!["open"]);
    }

    #[actix_web::test]
    async fn test_select_plan() {
        let hooks = Arc::new(RecordingHooks::default());
        let app = app!(hooks.clone());

        let req = test::TestRequest::post()
            .uri("/api/v1/pricing/acme/plans/1/select")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["plan"]["title"], "Pro");
        assert_eq!(body["data"]["plan"]["period"], "mth");

        let req = test::TestRequest::post()
            .uri("/api/v1/pricing/acme/plans/2/select")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        assert_eq!(hooks.events(), vec!["select:Pro"]);
    }
}
