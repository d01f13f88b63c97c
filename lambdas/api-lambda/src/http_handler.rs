use crate::responses::{
    self, created, file, message, no_content, ok, parse_body, HandlerResult,
};
use lambda_http::{http::Method, Body, Error, Request, RequestExt, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use workshop_shared::registrations::{self, PaymentSubmission};
use workshop_shared::session::Session;
use workshop_shared::storage::{self, PreviewParams};
use workshop_shared::types::{
    AuthTokens, DecisionRequest, FileUpload, ForgotPasswordRequest, Instructor, InstructorRequest,
    LoginRequest, RegisterRequest, ResetPasswordRequest, SubmitPaymentRequest, SupportStaff,
    SupportStaffRequest, UpdateProfileRequest, UserProfile, VerifyEmailRequest,
};
use workshop_shared::{instructors, reports, workshop, AppState};

#[derive(Serialize)]
struct AuthResponse<'a> {
    #[serde(flatten)]
    tokens: &'a AuthTokens,
    user: Option<&'a UserProfile>,
}

#[derive(Serialize)]
struct SessionResponse<'a> {
    user: Option<&'a UserProfile>,
    email_verified: bool,
}

/// Directory entries carry a ready-to-use image URL next to the reference.
#[derive(Serialize)]
struct InstructorView {
    #[serde(flatten)]
    instructor: Instructor,
    profile_image_url: Option<String>,
}

#[derive(Serialize)]
struct SupportStaffView {
    #[serde(flatten)]
    staff: SupportStaff,
    profile_image_url: Option<String>,
}

fn instructor_view(state: &AppState, instructor: Instructor) -> InstructorView {
    let profile_image_url = instructor
        .profile_image
        .as_ref()
        .map(|image| storage::image_url(&state.config, image));
    InstructorView {
        instructor,
        profile_image_url,
    }
}

fn support_staff_view(state: &AppState, staff: SupportStaff) -> SupportStaffView {
    let profile_image_url = staff
        .profile_image
        .as_ref()
        .map(|image| storage::image_url(&state.config, image));
    SupportStaffView {
        staff,
        profile_image_url,
    }
}

fn bearer_token(event: &Request) -> Option<String> {
    event
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn query_params(event: &Request) -> HashMap<String, String> {
    event
        .query_string_parameters()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Main Lambda handler
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method().clone();
    let path = event.uri().path().to_string();
    tracing::info!("Workshop API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        return responses::cors_preflight();
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let result = match parts.first().copied() {
        Some("workshop" | "instructors" | "support-staff" | "files") => {
            public_route(&event, &state, &method, &parts).await
        }
        Some("auth" | "users" | "registrations" | "admin") => {
            match Session::restore(state.clone(), bearer_token(&event).as_deref()).await {
                Ok(mut session) => session_route(&event, &mut session, &method, &parts).await,
                Err(e) => Some(Err(e)),
            }
        }
        _ => None,
    };

    match result {
        Some(Ok(response)) => Ok(response),
        Some(Err(e)) => responses::error(&e),
        None => responses::not_found(),
    }
}

/// Routes that never look at the caller.
async fn public_route(
    event: &Request,
    state: &Arc<AppState>,
    method: &Method,
    parts: &[&str],
) -> Option<HandlerResult> {
    let result = match (method, parts) {
        // GET /workshop - registration window, fee and payment channel
        (&Method::GET, ["workshop"]) => ok(&workshop::workshop_info(&state.config, chrono::Utc::now())),
        // GET /instructors - public directory
        (&Method::GET, ["instructors"]) => list_instructors(state).await,
        // GET /support-staff
        (&Method::GET, ["support-staff"]) => list_support_staff(state).await,
        // GET /files/{id}/view - stored bytes as uploaded
        (&Method::GET, ["files", file_id, "view"]) => match storage::view_file(state, file_id).await {
            Ok(contents) => file(&contents.content_type, contents.bytes),
            Err(e) => Err(e),
        },
        // GET /files/{id}/preview?width&height&gravity&quality - JPEG thumbnail
        (&Method::GET, ["files", file_id, "preview"]) => {
            preview_file(state, file_id, &query_params(event)).await
        }
        _ => return None,
    };
    Some(result)
}

/// Routes that act on behalf of the caller's session.
async fn session_route(
    event: &Request,
    session: &mut Session,
    method: &Method,
    parts: &[&str],
) -> Option<HandlerResult> {
    let body: &[u8] = event.body();
    let result = match (method, parts) {
        // --- AUTH ---
        (&Method::POST, ["auth", "register"]) => register(session, body).await,
        (&Method::POST, ["auth", "login"]) => login(session, body).await,
        (&Method::POST, ["auth", "logout"]) => logout(session).await,
        (&Method::GET, ["auth", "session"]) => ok(&SessionResponse {
            user: session.user(),
            email_verified: session.email_verified(),
        }),
        (&Method::POST, ["auth", "verify-email"]) => verify_email(session, body).await,
        (&Method::POST, ["auth", "forgot-password"]) => forgot_password(session, body).await,
        (&Method::POST, ["auth", "reset-password"]) => reset_password(session, body).await,

        // --- USERS ---
        (&Method::PATCH, ["users", "me"]) => update_me(session, body).await,
        (&Method::PUT, ["users", "me", "picture"]) => update_picture(session, body).await,

        // --- REGISTRATIONS ---
        (&Method::GET, ["registrations", "me"]) => {
            registrations::my_registration(session).await.and_then(|r| ok(&r))
        }
        (&Method::POST, ["registrations"]) => {
            registrations::register(session).await.and_then(|r| created(&r))
        }
        (&Method::POST, ["registrations", registration_id, "payment"]) => {
            submit_payment(session, registration_id, body).await
        }
        (&Method::GET, ["registrations", "me", "event-details"]) => {
            reports::event_details(session).await.and_then(|d| ok(&d))
        }

        // --- ADMIN ---
        (&Method::GET, ["admin", "stats"]) => reports::admin_stats(session).await.and_then(|s| ok(&s)),
        (&Method::GET, ["admin", "users"]) => {
            registrations::list_users(session).await.and_then(|u| ok(&u))
        }
        (&Method::PATCH, ["admin", "users", user_id, "status"]) => {
            match parse_body::<DecisionRequest>(body) {
                Ok(req) => registrations::update_registration_status(session, user_id, req.status)
                    .await
                    .and_then(|u| ok(&u)),
                Err(e) => Err(e),
            }
        }
        (&Method::GET, ["admin", "registrations"]) => {
            registrations::list_registrations(session).await.and_then(|r| ok(&r))
        }
        (&Method::PATCH, ["admin", "registrations", registration_id, "payment"]) => {
            match parse_body::<DecisionRequest>(body) {
                Ok(req) => registrations::decide_payment(session, registration_id, req.status)
                    .await
                    .and_then(|r| ok(&r)),
                Err(e) => Err(e),
            }
        }
        (&Method::GET, ["admin", "reports", "payments"]) => {
            reports::payment_report(session).await.and_then(|r| ok(&r))
        }
        (&Method::GET, ["admin", "reports", "summary"]) => {
            reports::summary_report(session).await.and_then(|r| ok(&r))
        }
        (&Method::GET, ["admin", "instructors"]) => match session.require_admin() {
            Ok(_) => list_instructors(session.state()).await,
            Err(e) => Err(e),
        },
        (&Method::POST, ["admin", "instructors"]) => create_instructor(session, body).await,
        (&Method::PUT, ["admin", "instructors", instructor_id]) => {
            update_instructor(session, instructor_id, body).await
        }
        (&Method::DELETE, ["admin", "instructors", instructor_id]) => {
            instructors::delete_instructor(session, instructor_id)
                .await
                .and_then(|_| no_content())
        }
        (&Method::POST, ["admin", "support-staff"]) => create_support_staff(session, body).await,
        (&Method::PUT, ["admin", "support-staff", staff_id]) => {
            update_support_staff(session, staff_id, body).await
        }
        (&Method::DELETE, ["admin", "support-staff", staff_id]) => {
            instructors::delete_support_staff(session, staff_id)
                .await
                .and_then(|_| no_content())
        }
        _ => return None,
    };
    Some(result)
}

// ========== PUBLIC ==========
async fn list_instructors(state: &Arc<AppState>) -> HandlerResult {
    let views: Vec<InstructorView> = instructors::list_instructors(state)
        .await?
        .into_iter()
        .map(|i| instructor_view(state, i))
        .collect();
    ok(&views)
}

async fn list_support_staff(state: &Arc<AppState>) -> HandlerResult {
    let views: Vec<SupportStaffView> = instructors::list_support_staff(state)
        .await?
        .into_iter()
        .map(|s| support_staff_view(state, s))
        .collect();
    ok(&views)
}

async fn preview_file(
    state: &Arc<AppState>,
    file_id: &str,
    query: &HashMap<String, String>,
) -> HandlerResult {
    let params = PreviewParams::from_query(query)?;
    let jpeg = storage::preview_file(state, file_id, &params).await?;
    file("image/jpeg", jpeg)
}

// ========== AUTH ==========
async fn register(session: &mut Session, body: &[u8]) -> HandlerResult {
    let req: RegisterRequest = parse_body(body)?;
    tracing::info!("Signup request received for {}", req.email);
    let tokens = session.register(&req).await?;
    created(&AuthResponse {
        tokens: &tokens,
        user: session.user(),
    })
}

async fn login(session: &mut Session, body: &[u8]) -> HandlerResult {
    let req: LoginRequest = parse_body(body)?;
    tracing::info!("Login request received for {}", req.email);
    let tokens = session.login(&req).await?;
    ok(&AuthResponse {
        tokens: &tokens,
        user: session.user(),
    })
}

async fn logout(session: &mut Session) -> HandlerResult {
    session.require_user()?;
    session.logout().await?;
    no_content()
}

async fn verify_email(session: &mut Session, body: &[u8]) -> HandlerResult {
    let req: VerifyEmailRequest = parse_body(body)?;
    session.confirm_email_verification(&req.code).await?;
    message("Email verified")
}

async fn forgot_password(session: &Session, body: &[u8]) -> HandlerResult {
    let req: ForgotPasswordRequest = parse_body(body)?;
    session.request_password_reset(&req.email).await?;
    message("If an account exists for this email, a reset code has been sent")
}

async fn reset_password(session: &Session, body: &[u8]) -> HandlerResult {
    let req: ResetPasswordRequest = parse_body(body)?;
    session.confirm_password_reset(&req).await?;
    message("Password has been reset")
}

// ========== USERS ==========
async fn update_me(session: &mut Session, body: &[u8]) -> HandlerResult {
    let req: UpdateProfileRequest = parse_body(body)?;
    let user = session.update_user(&req).await?;
    ok(&user)
}

async fn update_picture(session: &mut Session, body: &[u8]) -> HandlerResult {
    session.require_user()?;
    let upload: FileUpload = parse_body(body)?;
    let file = storage::decode_upload(&upload)?;
    let user = session.update_profile_picture(&file).await?;
    ok(&user)
}

// ========== REGISTRATIONS ==========
async fn submit_payment(session: &Session, registration_id: &str, body: &[u8]) -> HandlerResult {
    session.require_user()?;
    let req: SubmitPaymentRequest = parse_body(body)?;
    let screenshot = req
        .screenshot
        .as_ref()
        .map(storage::decode_upload)
        .transpose()?;

    let registration = registrations::submit_payment(
        session,
        registration_id,
        PaymentSubmission {
            transaction_number: req.transaction_number,
            transaction_id: req.transaction_id,
            screenshot,
        },
    )
    .await?;
    ok(&registration)
}

// ========== ADMIN DIRECTORY ==========
async fn create_instructor(session: &Session, body: &[u8]) -> HandlerResult {
    session.require_admin()?;
    let req: InstructorRequest = parse_body(body)?;
    let instructor = instructors::create_instructor(session, &req).await?;
    created(&instructor_view(session.state(), instructor))
}

async fn update_instructor(session: &Session, instructor_id: &str, body: &[u8]) -> HandlerResult {
    session.require_admin()?;
    let req: InstructorRequest = parse_body(body)?;
    let instructor = instructors::update_instructor(session, instructor_id, &req).await?;
    ok(&instructor_view(session.state(), instructor))
}

async fn create_support_staff(session: &Session, body: &[u8]) -> HandlerResult {
    session.require_admin()?;
    let req: SupportStaffRequest = parse_body(body)?;
    let staff = instructors::create_support_staff(session, &req).await?;
    created(&support_staff_view(session.state(), staff))
}

async fn update_support_staff(session: &Session, staff_id: &str, body: &[u8]) -> HandlerResult {
    session.require_admin()?;
    let req: SupportStaffRequest = parse_body(body)?;
    let staff = instructors::update_support_staff(session, staff_id, &req).await?;
    ok(&support_staff_view(session.state(), staff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use lambda_http::http::{self, StatusCode};
    use serde_json::{json, Map, Value};
    use std::io::Cursor;
    use workshop_shared::config::Config;

    fn request(method: &str, path: &str, token: Option<&str>, body: Value) -> Request {
        let mut builder = http::Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let body = if body.is_null() {
            Body::Empty
        } else {
            Body::from(body.to_string())
        };
        builder.body(body).unwrap()
    }

    async fn call(state: &Arc<AppState>, req: Request) -> (StatusCode, Value) {
        let response = function_handler(req, state.clone()).await.unwrap();
        let status = response.status();
        let value = match response.body() {
            Body::Text(text) => serde_json::from_str(text).unwrap_or(Value::Null),
            Body::Binary(bytes) => serde_json::from_slice(bytes).unwrap_or(Value::Null),
            Body::Empty => Value::Null,
        };
        (status, value)
    }

    fn signup_body(name: &str, student_id: &str) -> Value {
        json!({
            "name": name,
            "email": format!("{}@example.com", name.to_lowercase()),
            "student_id": student_id,
            "phone": "01712345678",
            "institution": "NCC",
            "password": "hunter2hunter2",
            "confirm_password": "hunter2hunter2",
        })
    }

    async fn signup(state: &Arc<AppState>, name: &str, student_id: &str) -> (String, String) {
        let (status, body) = call(
            state,
            request("POST", "/auth/register", None, signup_body(name, student_id)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    async fn admin_token(state: &Arc<AppState>) -> String {
        let (token, user_id) = signup(state, "Admin", "AD-0001").await;
        let mut patch = Map::new();
        patch.insert("role".to_string(), json!("admin"));
        state
            .documents
            .update(&state.config.collections.users, &user_id, patch)
            .await
            .unwrap();
        token
    }

    fn screenshot() -> Value {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(6, 6, Rgb([0, 0, 0])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        json!({
            "file_name": "bkash.png",
            "content_type": "image/png",
            "file_data": general_purpose::STANDARD.encode(buf.into_inner()),
        })
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let state = AppState::in_memory(Config::local());
        let response = function_handler(request("OPTIONS", "/admin/stats", None, Value::Null), state)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let state = AppState::in_memory(Config::local());
        let (status, _) = call(&state, request("GET", "/projects", None, Value::Null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_register_login_and_session() {
        let state = AppState::in_memory(Config::local());
        let (token, _) = signup(&state, "Nusrat", "CS-2405").await;

        let (status, body) = call(&state, request("GET", "/auth/session", Some(&token), Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["registration_status"], "pending");
        assert_eq!(body["email_verified"], false);

        let (status, body) = call(
            &state,
            request(
                "POST",
                "/auth/login",
                None,
                json!({"email": "nusrat@example.com", "password": "nope-nope"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "AuthenticationFailed");

        let (status, body) = call(
            &state,
            request(
                "POST",
                "/auth/login",
                None,
                json!({"email": "nusrat@example.com", "password": "hunter2hunter2"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["access_token"].as_str().unwrap().to_string();

        let (status, _) = call(&state, request("POST", "/auth/logout", Some(&token), Value::Null)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = call(&state, request("GET", "/auth/session", Some(&token), Value::Null)).await;
        assert_eq!(body["user"], Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_signup_is_bad_request() {
        let state = AppState::in_memory(Config::local());
        let (status, body) = call(
            &state,
            request("POST", "/auth/register", None, signup_body("Nusrat", "cs2405")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidRequest");
    }

    #[tokio::test]
    async fn test_admin_routes_refuse_non_admins() {
        let state = AppState::in_memory(Config::local());
        let (user_token, _) = signup(&state, "Nusrat", "CS-2405").await;

        for path in ["/admin/stats", "/admin/users", "/admin/registrations", "/admin/reports/summary"] {
            let (status, body) = call(&state, request("GET", path, None, Value::Null)).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{}", path);
            assert_eq!(body["error"], "AccessDenied");

            let (status, _) = call(&state, request("GET", path, Some(&user_token), Value::Null)).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{}", path);
        }

        let admin = admin_token(&state).await;
        let (status, body) = call(&state, request("GET", "/admin/stats", Some(&admin), Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_users"], 2);
    }

    #[tokio::test]
    async fn test_profile_update_ignores_role() {
        let state = AppState::in_memory(Config::local());
        let (token, _) = signup(&state, "Nusrat", "CS-2405").await;

        let (status, body) = call(
            &state,
            request(
                "PATCH",
                "/users/me",
                Some(&token),
                json!({"institution": "BUET", "role": "admin"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["institution"], "BUET");
        assert_eq!(body["role"], "user");

        let (status, body) = call(
            &state,
            request("PATCH", "/users/me", None, json!({"institution": "BUET"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "NotAuthenticated");
    }

    #[tokio::test]
    async fn test_anonymous_payment_is_unauthenticated_before_decoding() {
        let state = AppState::in_memory(Config::local());
        let (status, body) = call(
            &state,
            request(
                "POST",
                "/registrations/abc/payment",
                None,
                json!({
                    "transaction_number": "AG2H4K7L8M",
                    "transaction_id": "8G3K5L9MNO",
                    "screenshot": {
                        "file_name": "bkash.png",
                        "content_type": "image/png",
                        "file_data": "%%% not base64 %%%",
                    },
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "NotAuthenticated");
    }

    #[tokio::test]
    async fn test_payment_flow_over_http() {
        let state = AppState::in_memory(Config::local());
        let (token, _) = signup(&state, "Nusrat", "CS-2405").await;
        let admin = admin_token(&state).await;

        let (status, body) = call(
            &state,
            request("GET", "/registrations/me/event-details", Some(&token), Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "NotRegistered");

        let (status, registration) =
            call(&state, request("POST", "/registrations", Some(&token), Value::Null)).await;
        assert_eq!(status, StatusCode::CREATED);
        let registration_id = registration["id"].as_str().unwrap().to_string();

        let (status, _) = call(&state, request("POST", "/registrations", Some(&token), Value::Null)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(
            &state,
            request(
                "POST",
                &format!("/registrations/{}/payment", registration_id),
                Some(&token),
                json!({
                    "transaction_number": "AG2H4K7L8M",
                    "transaction_id": "8G3K5L9MNO",
                    "screenshot": screenshot(),
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payment_status"], "pending");

        let (status, body) = call(
            &state,
            request("GET", "/registrations/me/event-details", Some(&token), Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "PaymentNotVerified");

        let (status, body) = call(
            &state,
            request(
                "PATCH",
                &format!("/admin/registrations/{}/payment", registration_id),
                Some(&admin),
                json!({"status": "verified"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payment_status"], "verified");

        let (status, body) = call(
            &state,
            request("GET", "/registrations/me/event-details", Some(&token), Value::Null),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reference_code"], "NCC-CS-2405");

        // the stored screenshot is served back
        let (_, mine) = call(&state, request("GET", "/registrations/me", Some(&token), Value::Null)).await;
        let file_id = mine["registration"]["payment_screenshot_url"].as_str().unwrap();
        let response = function_handler(
            request("GET", &format!("/files/{}/view", file_id), None, Value::Null),
            state.clone(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Content-Type").unwrap(), "image/png");

        let response = function_handler(
            request("GET", &format!("/files/{}/preview", file_id), None, Value::Null),
            state.clone(),
        )
        .await
        .unwrap();
        assert_eq!(response.headers().get("Content-Type").unwrap(), "image/jpeg");
    }

    #[tokio::test]
    async fn test_public_instructor_listing() {
        let state = AppState::in_memory(Config::local());
        let admin = admin_token(&state).await;

        let (status, _) = call(
            &state,
            request(
                "POST",
                "/admin/instructors",
                Some(&admin),
                json!({
                    "name": "Tanvir Hasan",
                    "bio": "Penetration tester",
                    "expertise": ["", "Web security", ""],
                    "profile_image": "f1c2",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(&state, request("GET", "/instructors", None, Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["expertise"], json!(["Web security"]));
        assert_eq!(body[0]["profile_image"]["kind"], "stored");
        assert_eq!(
            body[0]["profile_image_url"],
            "http://localhost:9000/files/f1c2/preview?width=400&height=400&gravity=center&quality=100"
        );

        let (status, _) = call(&state, request("GET", "/admin/instructors", None, Value::Null)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_workshop_info_is_public() {
        let state = AppState::in_memory(Config::local());
        let (status, body) = call(&state, request("GET", "/workshop", None, Value::Null)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["fee"], "100 TK");
        assert_eq!(body["payment_number"], "01784275877");
    }
}
