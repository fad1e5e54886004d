#[cfg(test)]
mod integration_tests {
    use crate::auth::hash_password;
    use crate::handlers::auth::{LoginRequest, LoginResponse};
    use crate::handlers::buyers::{BuyerResponse, CreateBuyerRequest, UpdateBuyerProfileRequest};
    use crate::handlers::items::{CreateItemRequest, ItemResponse, UpdateItemRequest};
    use crate::handlers::orders::{CreateOrderRequest, TransactionPayload, UpdateOrderRequest};
    use crate::handlers::sellers::{
        CountyPayload, CreateSellerRequest, SellerProfileResponse, SubCountyPayload,
        UpdateSellerProfileRequest, UpdateUserPayload, UserPayload,
    };
    use crate::handlers::transactions::TransactionResponse;
    use crate::router::create_router;
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::{setup_test_app, setup_test_app_state};
    use axum::http::header::AUTHORIZATION;
    use axum::http::{HeaderValue, StatusCode};
    use axum_test::TestServer;
    use model::entities::{county, subcounty, user};
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};

    fn seller_request(username: &str, business_name: &str) -> CreateSellerRequest {
        CreateSellerRequest {
            business_name: business_name.to_string(),
            business_reg_no: "BN-2021-001".to_string(),
            phone_number: "0712000000".to_string(),
            sub_county: SubCountyPayload {
                subcounty_name: "Westlands".to_string(),
                county: CountyPayload {
                    county_name: "Nairobi".to_string(),
                    code: 47,
                },
            },
            town: "Nairobi".to_string(),
            local_area_name: "Parklands".to_string(),
            street: "Limuru Road".to_string(),
            building: "Highridge Plaza".to_string(),
            business_reg_doc: None,
            profile_pic: None,
            profile: UserPayload {
                username: username.to_string(),
                password: "secret123".to_string(),
                email: format!("{}@example.com", username),
            },
        }
    }

    fn buyer_request(username: &str) -> CreateBuyerRequest {
        CreateBuyerRequest {
            phone_number: "0722000000".to_string(),
            profile: UserPayload {
                username: username.to_string(),
                password: "secret123".to_string(),
                email: format!("{}@example.com", username),
            },
        }
    }

    fn item_request(name: &str, category: Option<&str>) -> CreateItemRequest {
        CreateItemRequest {
            item_name: name.to_string(),
            item_description: Some(format!("{} in bulk", name)),
            item_price: 750.0,
            item_measurement_unit: "bag".to_string(),
            item_main_image: None,
            item_extra_image1: None,
            item_extra_image2: None,
            item_extra_image3: None,
            item_extra_image4: None,
            category: category.map(str::to_string),
            item_seller: None,
        }
    }

    fn token_header(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Token {}", token)).unwrap()
    }

    async fn register_seller(
        server: &TestServer,
        username: &str,
        business_name: &str,
    ) -> SellerProfileResponse {
        let response = server
            .post("/create_seller_account")
            .json(&seller_request(username, business_name))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<SellerProfileResponse> = response.json();
        body.data
    }

    async fn register_buyer(server: &TestServer, username: &str) -> BuyerResponse {
        let response = server.post("/create_buyer").json(&buyer_request(username)).await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<BuyerResponse> = response.json();
        body.data
    }

    async fn login(server: &TestServer, username: &str) -> LoginResponse {
        let response = server
            .post("/login")
            .json(&LoginRequest {
                username: username.to_string(),
                password: "secret123".to_string(),
            })
            .await;
        response.assert_status(StatusCode::OK);
        response.json()
    }

    async fn create_item(
        server: &TestServer,
        seller_id: i32,
        token: &str,
        request: &CreateItemRequest,
    ) -> ItemResponse {
        let response = server
            .post(&format!("/sellers/{}/items/add_item", seller_id))
            .add_header(AUTHORIZATION, token_header(token))
            .json(request)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<ItemResponse> = response.json();
        body.data
    }

    fn order_request(recipient: i32, item_ids: Vec<i32>, forged_payer: Option<i32>) -> CreateOrderRequest {
        CreateOrderRequest {
            ordered_items: item_ids,
            total_amount_payable: 4500.0,
            payment_transaction: TransactionPayload {
                transaction_mode: "m-pesa".to_string(),
                amount: 4500.0,
                transaction_code: "QCD4X8M2P1".to_string(),
                recipient,
                payer: forged_payer,
            },
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_seller_registration_reuses_geography() {
        let state = setup_test_app_state().await;
        let server = TestServer::new(create_router(state.clone())).unwrap();

        register_seller(&server, "mjengo", "Mjengo Hardware").await;
        register_seller(&server, "bobs_steel", "Bob's Steel").await;

        // Same county and subcounty names must resolve to the same rows
        let counties = county::Entity::find().all(&state.db).await.unwrap();
        assert_eq!(counties.len(), 1);
        let subcounties = subcounty::Entity::find().all(&state.db).await.unwrap();
        assert_eq!(subcounties.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_seller_username_rejected() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        register_seller(&server, "mjengo", "Mjengo Hardware").await;

        let response = server
            .post("/create_seller_account")
            .json(&seller_request("mjengo", "Another Shop"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_buyer_can_become_seller_under_same_username() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        register_buyer(&server, "wanjiku").await;

        // The existing user account is reused rather than rejected
        let response = server
            .post("/create_seller_account")
            .json(&seller_request("wanjiku", "Wanjiku Timber"))
            .await;
        response.assert_status(StatusCode::CREATED);

        let login_response = login(&server, "wanjiku").await;
        assert_eq!(login_response.session_status.as_deref(), Some("seller"));
    }

    #[tokio::test]
    async fn test_login_role_resolution() {
        let state = setup_test_app_state().await;
        let server = TestServer::new(create_router(state.clone())).unwrap();

        // A bare user with neither profile classifies as neither role
        user::ActiveModel {
            username: Set("plain".to_string()),
            email: Set("plain@example.com".to_string()),
            password_hash: Set(hash_password("secret123").unwrap()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .unwrap();

        let plain = login(&server, "plain").await;
        assert!(plain.session_status.is_none());
        assert!(plain.account_id.is_none());
        assert!(!plain.token.is_empty());

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let seller_login = login(&server, "mjengo").await;
        assert_eq!(seller_login.session_status.as_deref(), Some("seller"));
        assert_eq!(seller_login.account_id, Some(seller.id));

        // Buyer logins report the buyer account id, not the user id
        let buyer = register_buyer(&server, "wanjiku").await;
        let buyer_login = login(&server, "wanjiku").await;
        assert_eq!(buyer_login.session_status.as_deref(), Some("buyer"));
        assert_eq!(buyer_login.account_id, Some(buyer.id));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        register_buyer(&server, "wanjiku").await;

        let response = server
            .post("/login")
            .json(&LoginRequest {
                username: "wanjiku".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_token_is_stable_across_logins() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        register_buyer(&server, "wanjiku").await;

        let first = login(&server, "wanjiku").await;
        let second = login(&server, "wanjiku").await;
        assert_eq!(first.token, second.token);
    }

    #[tokio::test]
    async fn test_profile_requires_authentication() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;

        let response = server.get(&format!("/sellers/{}/profile", seller.id)).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .get(&format!("/sellers/{}/profile", seller.id))
            .add_header(AUTHORIZATION, token_header("deadbeef"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_profile_access_limited_to_owner() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        register_seller(&server, "bobs_steel", "Bob's Steel").await;
        let intruder = login(&server, "bobs_steel").await;

        let response = server
            .get(&format!("/sellers/{}/profile", seller.id))
            .add_header(AUTHORIZATION, token_header(&intruder.token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let owner = login(&server, "mjengo").await;
        let response = server
            .get(&format!("/sellers/{}/profile", seller.id))
            .add_header(AUTHORIZATION, token_header(&owner.token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<SellerProfileResponse> = response.json();
        assert_eq!(body.data.business_name, "Mjengo Hardware");
    }

    #[tokio::test]
    async fn test_username_collision_on_profile_update() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        register_buyer(&server, "alice").await;
        let seller = register_seller(&server, "bob", "Bob's Steel").await;
        let bob = login(&server, "bob").await;

        let update = |username: &str| UpdateSellerProfileRequest {
            phone_number: None,
            town: None,
            local_area_name: None,
            street: None,
            building: None,
            profile_pic: None,
            profile: UpdateUserPayload {
                username: username.to_string(),
                email: "bob@example.com".to_string(),
            },
        };

        // Case-insensitive collision with another user's name
        let response = server
            .put(&format!("/sellers/{}/profile", seller.id))
            .add_header(AUTHORIZATION, token_header(&bob.token))
            .json(&update("ALICE"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Changing the case of one's own username is allowed
        let response = server
            .put(&format!("/sellers/{}/profile", seller.id))
            .add_header(AUTHORIZATION, token_header(&bob.token))
            .json(&update("BOB"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<SellerProfileResponse> = response.json();
        assert_eq!(body.data.profile.username, "BOB");
    }

    #[tokio::test]
    async fn test_username_collision_on_buyer_profile_update() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        register_seller(&server, "alice", "Alice Aggregates").await;
        let buyer = register_buyer(&server, "bob").await;
        let bob = login(&server, "bob").await;

        let update = |username: &str| UpdateBuyerProfileRequest {
            phone_number: None,
            profile: UpdateUserPayload {
                username: username.to_string(),
                email: "bob@example.com".to_string(),
            },
        };

        // Case-insensitive collision with another user's name
        let response = server
            .put(&format!("/buyers/{}/profile", buyer.id))
            .add_header(AUTHORIZATION, token_header(&bob.token))
            .json(&update("ALICE"))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Changing the case of one's own username is allowed
        let response = server
            .put(&format!("/buyers/{}/profile", buyer.id))
            .add_header(AUTHORIZATION, token_header(&bob.token))
            .json(&update("BOB"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<BuyerResponse> = response.json();
        assert_eq!(body.data.profile.username, "BOB");
    }

    #[tokio::test]
    async fn test_item_creation_derives_owner() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let token = login(&server, "mjengo").await.token;

        let mut request = item_request("Bamburi Cement 50kg", None);
        request.item_seller = Some(seller.id + 99);

        let item = create_item(&server, seller.id, &token, &request).await;
        assert_eq!(item.item_seller, seller.id);
        // Omitted category falls back to the catch-all bucket
        assert_eq!(item.category, "others");
        assert_eq!(item.item_main_image, "images/product/main.jpg");
    }

    #[tokio::test]
    async fn test_item_creation_requires_seller_profile() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        register_buyer(&server, "wanjiku").await;
        let buyer_token = login(&server, "wanjiku").await.token;

        let response = server
            .post(&format!("/sellers/{}/items/add_item", seller.id))
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .json(&item_request("Bamburi Cement 50kg", None))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_item_creation_rejects_bad_input() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let token = login(&server, "mjengo").await.token;

        let mut negative = item_request("Bamburi Cement 50kg", None);
        negative.item_price = -1.0;
        let response = server
            .post(&format!("/sellers/{}/items/add_item", seller.id))
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&negative)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post(&format!("/sellers/{}/items/add_item", seller.id))
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&item_request("Bamburi Cement 50kg", Some("not-a-category")))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_item_update_requires_owner() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let token = login(&server, "mjengo").await.token;
        let item = create_item(
            &server,
            seller.id,
            &token,
            &item_request("Bamburi Cement 50kg", Some("cement")),
        )
        .await;

        register_seller(&server, "bobs_steel", "Bob's Steel").await;
        let intruder_token = login(&server, "bobs_steel").await.token;

        let update = UpdateItemRequest {
            item_name: None,
            item_description: None,
            item_price: Some(800.0),
            item_measurement_unit: None,
            item_main_image: None,
            item_extra_image1: None,
            item_extra_image2: None,
            item_extra_image3: None,
            item_extra_image4: None,
            category: None,
        };

        let response = server
            .put(&format!("/sellers/{}/items/{}", seller.id, item.id))
            .add_header(AUTHORIZATION, token_header(&intruder_token))
            .json(&update)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .delete(&format!("/sellers/{}/items/{}", seller.id, item.id))
            .add_header(AUTHORIZATION, token_header(&intruder_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server
            .put(&format!("/sellers/{}/items/{}", seller.id, item.id))
            .add_header(AUTHORIZATION, token_header(&token))
            .json(&update)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<ItemResponse> = response.json();
        assert_eq!(body.data.item_price, 800.0);
    }

    #[tokio::test]
    async fn test_catalog_search_and_category_filter() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let token = login(&server, "mjengo").await.token;
        create_item(
            &server,
            seller.id,
            &token,
            &item_request("Bamburi Cement 50kg", Some("cement")),
        )
        .await;
        create_item(
            &server,
            seller.id,
            &token,
            &item_request("Y12 Twisted Bar", Some("metal and steel work")),
        )
        .await;

        // Exact category filter
        let response = server.get("/items?category=cement").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["item_name"], "Bamburi Cement 50kg");
        assert_eq!(body.data[0]["item_seller"]["business_name"], "Mjengo Hardware");

        // Unknown categories are rejected rather than matching nothing
        let response = server.get("/items?category=bogus").await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Free-text search reaches the seller's business name
        let response = server.get("/items?search=Mjengo").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 2);

        // Seller-scoped search stays within the item fields
        let response = server
            .get(&format!("/sellers/{}/items?search=Twisted", seller.id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<ItemResponse>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].item_name, "Y12 Twisted Bar");
    }

    #[tokio::test]
    async fn test_order_submission_and_visibility() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let seller_token = login(&server, "mjengo").await.token;
        let item = create_item(
            &server,
            seller.id,
            &seller_token,
            &item_request("Bamburi Cement 50kg", Some("cement")),
        )
        .await;

        let buyer = register_buyer(&server, "wanjiku").await;
        let buyer_token = login(&server, "wanjiku").await.token;

        // The forged payer in the payload is replaced by the caller's buyer
        let response = server
            .post("/submit_order")
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .json(&order_request(seller.id, vec![item.id], Some(buyer.id + 99)))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let order_id = body.data["id"].as_i64().unwrap() as i32;
        assert_eq!(
            body.data["payment_transaction"]["payer"].as_i64().unwrap() as i32,
            buyer.id
        );
        assert_eq!(body.data["ordered_items"][0].as_i64().unwrap() as i32, item.id);

        // Recipient seller sees the order
        let response = server
            .get(&format!("/sellers/{}/orders", seller.id))
            .add_header(AUTHORIZATION, token_header(&seller_token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);

        // Paying buyer sees it in their own listing
        let response = server
            .get(&format!("/buyers/{}/orders", buyer.id))
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);

        // The buyer can read a single order but not its edit view
        let response = server
            .get(&format!("/sellers/{}/orders/{}", seller.id, order_id))
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .await;
        response.assert_status(StatusCode::OK);
        let response = server
            .get(&format!("/sellers/{}/orders/{}/edit", seller.id, order_id))
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // An unrelated seller sees none of it
        register_seller(&server, "bobs_steel", "Bob's Steel").await;
        let intruder_token = login(&server, "bobs_steel").await.token;
        let response = server
            .get(&format!("/sellers/{}/orders/{}", seller.id, order_id))
            .add_header(AUTHORIZATION, token_header(&intruder_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // The recipient marks the order delivered
        let response = server
            .put(&format!("/sellers/{}/orders/{}/edit", seller.id, order_id))
            .add_header(AUTHORIZATION, token_header(&seller_token))
            .json(&UpdateOrderRequest {
                total_amount_payable: None,
                is_delivered: Some(true),
                date_delivered: Some(chrono::Utc::now()),
            })
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["is_delivered"], true);
    }

    #[tokio::test]
    async fn test_order_submission_requires_buyer_profile() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let seller_token = login(&server, "mjengo").await.token;
        let item = create_item(
            &server,
            seller.id,
            &seller_token,
            &item_request("Bamburi Cement 50kg", Some("cement")),
        )
        .await;

        let response = server
            .post("/submit_order")
            .add_header(AUTHORIZATION, token_header(&seller_token))
            .json(&order_request(seller.id, vec![item.id], None))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_order_submission_validates_payload() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let seller_token = login(&server, "mjengo").await.token;
        let item = create_item(
            &server,
            seller.id,
            &seller_token,
            &item_request("Bamburi Cement 50kg", Some("cement")),
        )
        .await;

        register_buyer(&server, "wanjiku").await;
        let buyer_token = login(&server, "wanjiku").await.token;

        // Unknown transaction mode
        let mut bad_mode = order_request(seller.id, vec![item.id], None);
        bad_mode.payment_transaction.transaction_mode = "cash".to_string();
        let response = server
            .post("/submit_order")
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .json(&bad_mode)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Unknown item
        let response = server
            .post("/submit_order")
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .json(&order_request(seller.id, vec![item.id + 99], None))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Unknown recipient
        let response = server
            .post("/submit_order")
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .json(&order_request(seller.id + 99, vec![item.id], None))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Empty item list
        let response = server
            .post("/submit_order")
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .json(&order_request(seller.id, vec![], None))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_seller_transactions_visible_to_recipient_only() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let seller_token = login(&server, "mjengo").await.token;
        let item = create_item(
            &server,
            seller.id,
            &seller_token,
            &item_request("Bamburi Cement 50kg", Some("cement")),
        )
        .await;

        register_buyer(&server, "wanjiku").await;
        let buyer_token = login(&server, "wanjiku").await.token;
        let response = server
            .post("/submit_order")
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .json(&order_request(seller.id, vec![item.id], None))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/sellers/{}/transactions", seller.id))
            .add_header(AUTHORIZATION, token_header(&seller_token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<TransactionResponse>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0].transaction_mode, "m-pesa");
        assert_eq!(body.data[0].recipient, seller.id);

        let response = server
            .get(&format!("/sellers/{}/transactions", seller.id))
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_deleted_buyer_leaves_order_readable_by_seller() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;
        let seller_token = login(&server, "mjengo").await.token;
        let item = create_item(
            &server,
            seller.id,
            &seller_token,
            &item_request("Bamburi Cement 50kg", Some("cement")),
        )
        .await;

        let buyer = register_buyer(&server, "wanjiku").await;
        let buyer_token = login(&server, "wanjiku").await.token;
        let response = server
            .post("/submit_order")
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .json(&order_request(seller.id, vec![item.id], None))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let order_id = body.data["id"].as_i64().unwrap() as i32;

        let response = server
            .delete(&format!("/buyers/{}/profile", buyer.id))
            .add_header(AUTHORIZATION, token_header(&buyer_token))
            .await;
        response.assert_status(StatusCode::OK);

        // The payer is nullified but the order and transaction survive
        let response = server
            .get(&format!("/sellers/{}/orders/{}", seller.id, order_id))
            .add_header(AUTHORIZATION, token_header(&seller_token))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.data["payment_transaction"]["payer"].is_null());
    }

    #[tokio::test]
    async fn test_malformed_json_returns_bad_request() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/create_buyer")
            .content_type("application/json")
            .text("{not json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_public_listings_need_no_authentication() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let seller = register_seller(&server, "mjengo", "Mjengo Hardware").await;

        let response = server.get("/sellers").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<serde_json::Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        // The public view omits registration details
        assert!(body.data[0].get("business_reg_no").is_none());

        let response = server.get(&format!("/sellers/{}", seller.id)).await;
        response.assert_status(StatusCode::OK);

        let response = server.get("/items").await;
        response.assert_status(StatusCode::OK);
    }
}
