use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::{
    db::OrmConn,
    entity::payments::{self, Entity as Payments},
    error::{AppError, AppResult, is_unique_violation},
    mappers::{AccessPolicy, AddOutcome, Mapper},
    models::{CardInfo, Payment, PaymentFactory, PaymentLocation, PaymentType},
    state::AppState,
};

#[derive(Debug, Default, Clone)]
pub struct PaymentPatch {
    pub owner: Option<String>,
    /// Replaces the card on file. Ignored for cash and check payments.
    pub card: Option<CardInfo>,
}

#[derive(Clone)]
pub struct PaymentMapper {
    db: OrmConn,
}

impl PaymentMapper {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.orm.clone(),
        }
    }

    pub async fn find_by_number(&self, number: i64) -> AppResult<Option<Payment>> {
        Payments::find()
            .filter(payments::Column::PaymentNumber.eq(number))
            .one(&self.db)
            .await?
            .map(payment_from_model)
            .transpose()
    }

    pub async fn find_by_id(&self, payment_id: i32) -> AppResult<Option<Payment>> {
        Payments::find_by_id(payment_id)
            .one(&self.db)
            .await?
            .map(payment_from_model)
            .transpose()
    }
}

#[async_trait]
impl Mapper for PaymentMapper {
    type Entity = Payment;
    type Patch = PaymentPatch;

    const POLICY: AccessPolicy = AccessPolicy::PRIVILEGED;

    async fn add(&self, payment: &Payment) -> AppResult<AddOutcome> {
        match insert_payment(&self.db, payment).await {
            Ok(id) => Ok(AddOutcome::Added(id)),
            Err(AppError::OrmError(err)) if is_unique_violation(&err) => {
                tracing::warn!(payment_number = payment.number(), "payment number already stored");
                Ok(AddOutcome::Conflict)
            }
            Err(err) => Err(err),
        }
    }

    async fn edit(&self, payment: &Payment, patch: PaymentPatch) -> AppResult<bool> {
        let Some(row) = Payments::find()
            .filter(payments::Column::PaymentNumber.eq(payment.number()))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };

        let mut active: payments::ActiveModel = row.into();
        if let Some(owner) = patch.owner {
            active.user_name = Set(owner);
        }
        if let Some(card) = patch.card.filter(|_| payment.kind().needs_card()) {
            active.card_number = Set(Some(card.number));
            active.exp_date = Set(Some(card.expiration));
            active.csv = Set(Some(card.csv));
        }
        if active.is_changed() {
            active.update(&self.db).await?;
        }
        Ok(true)
    }

    async fn remove(&self, payment: &Payment) -> AppResult<bool> {
        let res = Payments::delete_many()
            .filter(payments::Column::PaymentNumber.eq(payment.number()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    /// First stored payment with the same owner and type.
    async fn get(&self, payment: &Payment) -> AppResult<Option<Payment>> {
        Payments::find()
            .filter(payments::Column::UserName.eq(payment.owner()))
            .filter(payments::Column::PaymentType.eq(payment.kind().code()))
            .order_by_asc(payments::Column::PaymentId)
            .one(&self.db)
            .await?
            .map(payment_from_model)
            .transpose()
    }

    async fn get_current(&self) -> AppResult<Vec<Payment>> {
        Payments::find()
            .order_by_asc(payments::Column::PaymentNumber)
            .all(&self.db)
            .await?
            .into_iter()
            .map(payment_from_model)
            .collect()
    }
}

pub(crate) async fn insert_payment<C: ConnectionTrait>(conn: &C, payment: &Payment) -> AppResult<i32> {
    let card = payment.card();
    let res = Payments::insert(payments::ActiveModel {
        payment_id: NotSet,
        payment_number: Set(payment.number()),
        user_name: Set(payment.owner().to_string()),
        payment_type: Set(payment.kind().code()),
        payment_location: Set(payment.location().code()),
        card_number: Set(card.map(|c| c.number.clone())),
        exp_date: Set(card.map(|c| c.expiration.clone())),
        csv: Set(card.map(|c| c.csv.clone())),
    })
    .exec(conn)
    .await?;

    tracing::debug!(
        payment_id = res.last_insert_id,
        payment_number = payment.number(),
        kind = %payment.kind(),
        "payment stored"
    );
    Ok(res.last_insert_id)
}

/// Row id for `payment`, reusing the stored row when its number is already
/// taken.
pub(crate) async fn resolve_payment_id<C: ConnectionTrait>(
    conn: &C,
    payment: &Payment,
) -> AppResult<i32> {
    if let Some(existing) = Payments::find()
        .filter(payments::Column::PaymentNumber.eq(payment.number()))
        .one(conn)
        .await?
    {
        return Ok(existing.payment_id);
    }
    insert_payment(conn, payment).await
}

pub(crate) fn payment_from_model(model: payments::Model) -> AppResult<Payment> {
    let kind = PaymentType::try_from(model.payment_type)?;
    let location = PaymentLocation::try_from(model.payment_location)?;
    let card = match (model.card_number, model.exp_date, model.csv) {
        (Some(number), Some(expiration), Some(csv)) => Some(CardInfo::new(number, expiration, csv)),
        _ => None,
    };
    PaymentFactory::create(kind, model.user_name, location, card, model.payment_number)
}
