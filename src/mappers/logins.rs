use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use crate::{
    db::OrmConn,
    entity::user_login::{self, Entity as UserLogins},
    error::{AppResult, is_unique_violation},
    mappers::{AccessPolicy, AddOutcome, Mapper},
    models::{UserLogin, UserType},
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct LoginPatch {
    /// Already hashed.
    pub password: Option<String>,
    pub active: Option<bool>,
}

#[derive(Clone)]
pub struct LoginMapper {
    db: OrmConn,
}

impl LoginMapper {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.orm.clone(),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<UserLogin>> {
        UserLogins::find_by_id(username.to_string())
            .one(&self.db)
            .await?
            .map(login_from_model)
            .transpose()
    }

    /// Employee login with this username, if any.
    pub async fn find_employee(&self, username: &str) -> AppResult<Option<UserLogin>> {
        self.find_of_type(username, UserType::Employee).await
    }

    /// Customer login with this username, if any.
    pub async fn find_customer(&self, username: &str) -> AppResult<Option<UserLogin>> {
        self.find_of_type(username, UserType::Customer).await
    }

    async fn find_of_type(&self, username: &str, user_type: UserType) -> AppResult<Option<UserLogin>> {
        UserLogins::find()
            .filter(user_login::Column::Username.eq(username))
            .filter(user_login::Column::UserType.eq(user_type.as_str()))
            .one(&self.db)
            .await?
            .map(login_from_model)
            .transpose()
    }

    /// Flips the session flag. Returns false when the username is unknown.
    pub async fn set_active(&self, username: &str, active: bool) -> AppResult<bool> {
        let res = UserLogins::update_many()
            .col_expr(user_login::Column::Status, Expr::value(active))
            .filter(user_login::Column::Username.eq(username))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    /// Logins with an open session.
    pub async fn current_logins(&self) -> AppResult<Vec<UserLogin>> {
        UserLogins::find()
            .filter(user_login::Column::Status.eq(true))
            .order_by_asc(user_login::Column::Username)
            .all(&self.db)
            .await?
            .into_iter()
            .map(login_from_model)
            .collect()
    }
}

#[async_trait]
impl Mapper for LoginMapper {
    type Entity = UserLogin;
    type Patch = LoginPatch;

    const POLICY: AccessPolicy = AccessPolicy::PRIVILEGED;

    async fn add(&self, login: &UserLogin) -> AppResult<AddOutcome> {
        insert_login(&self.db, login).await
    }

    async fn edit(&self, login: &UserLogin, patch: LoginPatch) -> AppResult<bool> {
        let Some(row) = UserLogins::find_by_id(login.username.clone())
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };

        let mut active: user_login::ActiveModel = row.into();
        if let Some(password) = patch.password {
            active.password = Set(password);
        }
        if let Some(flag) = patch.active {
            active.status = Set(flag);
        }
        if active.is_changed() {
            active.update(&self.db).await?;
        }
        Ok(true)
    }

    async fn remove(&self, login: &UserLogin) -> AppResult<bool> {
        let res = UserLogins::delete_by_id(login.username.clone())
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn get(&self, login: &UserLogin) -> AppResult<Option<UserLogin>> {
        self.find_by_username(&login.username).await
    }

    async fn get_current(&self) -> AppResult<Vec<UserLogin>> {
        UserLogins::find()
            .order_by_asc(user_login::Column::Username)
            .all(&self.db)
            .await?
            .into_iter()
            .map(login_from_model)
            .collect()
    }
}

/// Logins are keyed by username, so `Added` carries the owner's row id (0
/// when the login has no owner).
pub(crate) async fn insert_login<C: ConnectionTrait>(
    conn: &C,
    login: &UserLogin,
) -> AppResult<AddOutcome> {
    let (employee_id, customer_id) = match login.user_type {
        UserType::Employee => (login.owner_id, None),
        UserType::Customer => (None, login.owner_id),
    };

    let res = UserLogins::insert(user_login::ActiveModel {
        username: Set(login.username.clone()),
        password: Set(login.password.clone()),
        user_type: Set(login.user_type.as_str().to_string()),
        status: Set(login.active),
        employee_id: Set(employee_id),
        customer_id: Set(customer_id),
    })
    .exec_without_returning(conn)
    .await;

    match res {
        Ok(_) => {
            tracing::debug!(username = %login.username, user_type = login.user_type.as_str(), "login stored");
            Ok(AddOutcome::Added(login.owner_id.unwrap_or_default()))
        }
        Err(err) if is_unique_violation(&err) => {
            tracing::warn!(username = %login.username, "username already taken");
            Ok(AddOutcome::Conflict)
        }
        Err(err) => Err(err.into()),
    }
}

fn login_from_model(model: user_login::Model) -> AppResult<UserLogin> {
    let user_type: UserType = model.user_type.parse()?;
    let owner_id = match user_type {
        UserType::Employee => model.employee_id,
        UserType::Customer => model.customer_id,
    };
    let mut login = UserLogin::new(model.username, model.password, user_type, owner_id);
    login.active = model.status;
    Ok(login)
}
