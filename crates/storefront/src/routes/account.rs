//! Account route handlers.
//!
//! Sign-in exchanges email and password for a backend token held in the
//! session. The overview requires it; login and register pages do not.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use petvault_core::{CartId, Email};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Shell;
use super::order::OrderView;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::medusa::{MedusaError, RegisterInput};
use crate::middleware::{
    CspNonce, CurrentRegion, OptionalCustomer, RequireCustomer, clear_customer_token,
    set_customer_token,
};
use crate::models::{CustomerToken, session_keys};
use crate::state::AppState;

/// Orders shown on the overview.
const RECENT_ORDERS: u32 = 5;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LEN: usize = 8;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl RegisterForm {
    fn to_input(&self) -> std::result::Result<RegisterInput, String> {
        let email = Email::parse(&self.email).map_err(|e| format!("Enter a valid email address ({e})"))?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
        }

        Ok(RegisterInput {
            email: email.into_inner(),
            password: self.password.clone(),
            first_name: optional(&self.first_name),
            last_name: optional(&self.last_name),
            phone: optional(&self.phone),
        })
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/login.html")]
pub struct LoginTemplate {
    pub shell: Shell,
    pub email: String,
    pub error: Option<String>,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/register.html")]
pub struct RegisterTemplate {
    pub shell: Shell,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub error: Option<String>,
}

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/overview.html")]
pub struct OverviewTemplate {
    pub shell: Shell,
    pub name: String,
    pub email: String,
    pub orders: Vec<OrderView>,
}

/// Store the token, move the guest cart to the customer, and tag errors
/// with the customer from here on.
async fn start_session(
    state: &AppState,
    session: Session,
    region: &CurrentRegion,
    token: String,
) -> std::result::Result<(), tower_sessions::session::Error> {
    let token = CustomerToken::new(token);
    set_customer_token(&session, &token).await?;

    match state.cart_store(session, &region.region).await {
        Ok(mut store) => {
            if let Err(e) = store.transfer_to_customer(token.expose()).await {
                tracing::warn!(error = %e, "Failed to transfer cart to customer");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Failed to load cart for transfer"),
    }

    match state.medusa().get_customer(token.expose()).await {
        Ok(customer) => set_sentry_user(&customer.id, Some(&customer.email)),
        Err(e) => tracing::debug!(error = %e, "Could not load customer after sign-in"),
    }
    Ok(())
}

fn sign_in_error(e: &MedusaError) -> String {
    match e {
        MedusaError::Unauthorized | MedusaError::Api { status: 401, .. } => {
            "Invalid email or password".to_string()
        }
        _ => e.user_message(),
    }
}

/// Display the login page.
#[instrument(skip_all)]
pub async fn login_page(
    region: CurrentRegion,
    nonce: CspNonce,
    OptionalCustomer(customer): OptionalCustomer,
) -> Response {
    if customer.is_some() {
        return Redirect::to(&region.href("/account")).into_response();
    }

    LoginTemplate {
        shell: Shell::new(&region, nonce, false),
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Sign in with email and password.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    nonce: CspNonce,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim().to_string();

    let token = match state.medusa().login(&email, &form.password).await {
        Ok(token) => token,
        Err(e) => {
            tracing::info!(error = %e, "Sign-in rejected");
            return Ok(LoginTemplate {
                shell: Shell::new(&region, nonce, false),
                error: Some(sign_in_error(&e)),
                email,
            }
            .into_response());
        }
    };

    start_session(&state, session, &region, token).await?;
    Ok(Redirect::to(&region.href("/account")).into_response())
}

/// Display the registration page.
#[instrument(skip_all)]
pub async fn register_page(
    region: CurrentRegion,
    nonce: CspNonce,
    OptionalCustomer(customer): OptionalCustomer,
) -> Response {
    if customer.is_some() {
        return Redirect::to(&region.href("/account")).into_response();
    }

    RegisterTemplate {
        shell: Shell::new(&region, nonce, false),
        email: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        error: None,
    }
    .into_response()
}

/// Create an account and sign in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    nonce: CspNonce,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let failed = |message: String| RegisterTemplate {
        shell: Shell::new(&region, nonce.clone(), false),
        email: form.email.trim().to_string(),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        error: Some(message),
    };

    let input = match form.to_input() {
        Ok(input) => input,
        Err(message) => return Ok(failed(message).into_response()),
    };

    let token = match state.medusa().register(&input).await {
        Ok(token) => token,
        Err(e) => {
            tracing::info!(error = %e, "Registration rejected");
            return Ok(failed(e.user_message()).into_response());
        }
    };

    start_session(&state, session, &region, token).await?;
    Ok(Redirect::to(&region.href("/account")).into_response())
}

/// Sign out. The session forgets both the customer and the cart.
#[instrument(skip_all)]
pub async fn logout(session: Session, region: CurrentRegion) -> Result<Redirect> {
    clear_customer_token(&session).await?;
    session.remove::<CartId>(session_keys::CART_ID).await?;
    clear_sentry_user();
    Ok(Redirect::to(&region.href("/store")))
}

/// Display the account overview with recent orders.
#[instrument(skip_all)]
pub async fn overview(
    State(state): State<AppState>,
    session: Session,
    region: CurrentRegion,
    nonce: CspNonce,
    RequireCustomer(token): RequireCustomer,
) -> Result<Response> {
    let customer = match state.medusa().get_customer(token.expose()).await {
        Ok(customer) => customer,
        Err(MedusaError::Unauthorized) => {
            tracing::info!("Customer token rejected, signing out");
            clear_customer_token(&session).await?;
            return Ok(Redirect::to(&region.href("/account/login")).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let orders = state
        .medusa()
        .list_orders(token.expose(), RECENT_ORDERS)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load recent orders");
            Vec::new()
        });

    Ok(OverviewTemplate {
        shell: Shell::new(&region, nonce, true),
        name: customer.display_name(),
        email: customer.email.clone(),
        orders: orders.iter().map(OrderView::from).collect(),
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            email: "Buyer@Example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            first_name: " Ada ".to_string(),
            last_name: String::new(),
            phone: String::new(),
        }
    }

    #[test]
    fn test_register_form_builds_input() {
        let input = form().to_input().unwrap();
        assert_eq!(input.email, "Buyer@example.com");
        assert_eq!(input.first_name.as_deref(), Some("Ada"));
        assert_eq!(input.last_name, None);
    }

    #[test]
    fn test_register_form_rejects_short_password() {
        let form = RegisterForm {
            password: "short".to_string(),
            ..form()
        };
        assert!(form.to_input().unwrap_err().contains("at least 8"));
    }

    #[test]
    fn test_register_form_rejects_bad_email() {
        let form = RegisterForm {
            email: "not-an-email".to_string(),
            ..form()
        };
        assert!(form.to_input().is_err());
    }

    #[test]
    fn test_sign_in_error_hides_backend_detail() {
        assert_eq!(sign_in_error(&MedusaError::Unauthorized), "Invalid email or password");
        let api = MedusaError::Api {
            status: 400,
            message: "Identity with email already exists".to_string(),
        };
        assert_eq!(sign_in_error(&api), "Identity with email already exists");
    }
}
