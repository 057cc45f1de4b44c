mod common;

use pizza_store::{
    dto::auth::SignupRequest,
    error::AppError,
    mappers::{CustomerMapper, EmployeeMapper, LoginMapper, Mapper},
    middleware::auth::{decode_token, session_actor},
    models::{Employee, EmployeeRole, Role, UserLogin, UserType},
    proxy::AccessProxy,
    services::auth_service::{authenticate, hash_password, logout, sign_token, signup_customer},
    state::AppState,
};

async fn hire_baker(state: &AppState) -> anyhow::Result<()> {
    let baker = Employee::new("Jordan", "King", EmployeeRole::Baker).with_pay(1800);
    let employee_id = EmployeeMapper::new(state)
        .add(&baker)
        .await?
        .id()
        .expect("employee id");

    let login = UserLogin::new(
        "jking",
        hash_password("dough123")?,
        UserType::Employee,
        Some(employee_id),
    );
    assert!(LoginMapper::new(state).add(&login).await?.is_added());
    Ok(())
}

fn signup(username: &str, email: &str) -> SignupRequest {
    SignupRequest {
        first_name: "Sam".into(),
        last_name: "Hill".into(),
        email: email.into(),
        phone_number: Some("555-0100".into()),
        username: username.into(),
        password: "hunter22".into(),
    }
}

#[tokio::test]
async fn employee_login_resolves_their_role() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    hire_baker(&state).await?;

    let actor = authenticate(&state, "jking", "dough123").await?;
    assert_eq!(actor.username, "jking");
    assert_eq!(actor.name, "Jordan King");
    assert_eq!(actor.role, Role::Baker);

    let stored = LoginMapper::new(&state)
        .find_employee("jking")
        .await?
        .expect("login");
    assert!(stored.active);
    assert_ne!(stored.password, "dough123");
    Ok(())
}

#[tokio::test]
async fn second_login_is_rejected_until_logout() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    hire_baker(&state).await?;

    authenticate(&state, "jking", "dough123").await?;
    let again = authenticate(&state, "jking", "dough123").await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    logout(&state, "jking").await?;
    let stored = LoginMapper::new(&state)
        .find_by_username("jking")
        .await?
        .expect("login");
    assert!(!stored.active);

    let twice = logout(&state, "jking").await;
    assert!(matches!(twice, Err(AppError::BadRequest(_))));

    authenticate(&state, "jking", "dough123").await?;
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_rejected() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    hire_baker(&state).await?;

    let wrong = authenticate(&state, "jking", "crust").await;
    assert!(matches!(wrong, Err(AppError::BadRequest(_))));

    let unknown = authenticate(&state, "nobody", "dough123").await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    // A failed attempt leaves the session closed.
    let stored = LoginMapper::new(&state)
        .find_by_username("jking")
        .await?
        .expect("login");
    assert!(!stored.active);

    let missing = logout(&state, "nobody").await;
    assert!(matches!(missing, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn customer_signup_then_login() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let resp = signup_customer(&state, signup("samh", "sam@example.com")).await?;
    let created = resp.data.expect("signup data");
    assert_eq!(created.username, "samh");

    let login = LoginMapper::new(&state)
        .find_customer("samh")
        .await?
        .expect("customer login");
    assert_eq!(login.owner_id, Some(created.customer_id));
    assert!(LoginMapper::new(&state).find_employee("samh").await?.is_none());

    let actor = authenticate(&state, "samh", "hunter22").await?;
    assert_eq!(actor.role, Role::Customer);
    assert_eq!(actor.name, "Sam Hill");
    Ok(())
}

#[tokio::test]
async fn signup_rejects_taken_username_or_email() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    signup_customer(&state, signup("samh", "sam@example.com")).await?;

    let same_user = signup_customer(&state, signup("samh", "other@example.com")).await;
    assert!(matches!(same_user, Err(AppError::Conflict(_))));

    let same_email = signup_customer(&state, signup("sammy", "sam@example.com")).await;
    assert!(matches!(same_email, Err(AppError::Conflict(_))));

    let blank = signup_customer(&state, signup("  ", "blank@example.com")).await;
    assert!(matches!(blank, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn failed_signup_leaves_no_customer_behind() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    signup_customer(&state, signup("samh", "sam@example.com")).await?;

    let taken = signup_customer(&state, signup("samh", "pat@example.com")).await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));
    assert!(CustomerMapper::new(&state).find_by_email("pat@example.com").await?.is_none());

    // The email is still free for a retry under another username.
    let retry = signup_customer(&state, signup("pathill", "pat@example.com")).await?;
    assert_eq!(retry.data.expect("signup data").username, "pathill");
    Ok(())
}

#[tokio::test]
async fn only_an_administrator_sees_open_sessions() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    hire_baker(&state).await?;
    signup_customer(&state, signup("samh", "sam@example.com")).await?;
    authenticate(&state, "jking", "dough123").await?;

    let mut logins = AccessProxy::new(LoginMapper::new(&state), common::baker());
    assert!(matches!(
        logins.current_logins().await,
        Err(AppError::Unauthorized { .. })
    ));

    logins.set_actor(common::admin());
    let open = logins.current_logins().await?;
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].username, "jking");
    assert_eq!(logins.get_current().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn token_stops_working_after_logout() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    hire_baker(&state).await?;

    let actor = authenticate(&state, "jking", "dough123").await?;
    let token = sign_token(&actor, "test-secret")?;
    assert!(matches!(decode_token(&token, "other-secret"), Err(AppError::BadRequest(_))));

    let resolved = session_actor(&state, decode_token(&token, "test-secret")?).await?;
    assert_eq!(resolved, actor);

    logout(&state, "jking").await?;
    let after = session_actor(&state, decode_token(&token, "test-secret")?).await;
    assert!(matches!(after, Err(AppError::BadRequest(_))));

    // A fresh login opens the session again for new tokens.
    let actor = authenticate(&state, "jking", "dough123").await?;
    let token = sign_token(&actor, "test-secret")?;
    assert!(session_actor(&state, decode_token(&token, "test-secret")?).await.is_ok());
    Ok(())
}
