use crate::{
    dto::orders::{CheckoutRequest, OrderList, OrderView, PaymentRequest},
    error::{AppError, AppResult},
    mappers::{AddOutcome, CustomerMapper, ItemMapper, LoginMapper, Mapper, OrderMapper},
    middleware::auth::{Actor, require_capability},
    models::{
        CardInfo, Customer, Order, OrderBuilder, OrderTransition, Payment, PaymentBuilder, PaymentLocation,
        PaymentType, ShoppingCart,
    },
    proxy::AccessProxy,
    response::ApiResponse,
    state::AppState,
};

/// Submits `order` (issuing its number on first submit) and stores it
/// through the order proxy, so only an administrator gets it on file.
pub async fn place_order(state: &AppState, actor: &Actor, mut order: Order) -> AppResult<Order> {
    let number = order.submit(&state.sequences)?;

    let orders = AccessProxy::new(OrderMapper::new(state), actor.clone());
    let outcome = orders.add(&order).await?;
    stored(outcome, number, &actor.name)?;
    Ok(order)
}

fn stored(outcome: AddOutcome, number: i64, placed_by: &str) -> AppResult<()> {
    match outcome {
        AddOutcome::Added(order_id) => {
            tracing::info!(order_id, order_number = number, placed_by, "order placed");
            Ok(())
        }
        AddOutcome::Conflict => Err(AppError::Conflict(format!(
            "order {number} was already placed"
        ))),
    }
}

/// Moves a stored order one step through the kitchen and delivery flow.
/// Only the role owning the step may take it, and only from the status
/// right before it.
pub async fn advance_order(
    state: &AppState,
    actor: &Actor,
    number: i64,
    transition: OrderTransition,
) -> AppResult<Order> {
    require_capability(actor, transition.capability())?;

    let mapper = OrderMapper::new(state);
    let mut order = mapper
        .find_by_number(number)
        .await?
        .ok_or(AppError::NotFound)?;
    let status = order.advance(transition)?;
    mapper.set_status(number, status).await?;

    tracing::info!(order_number = number, %status, actor = %actor.name, "order advanced");
    Ok(order)
}

pub async fn list_open_orders(state: &AppState, actor: &Actor) -> AppResult<ApiResponse<OrderList>> {
    let orders = AccessProxy::new(OrderMapper::new(state), actor.clone())
        .get_current()
        .await?;
    let total = orders.len();
    let items = orders.iter().map(OrderView::from).collect();
    Ok(ApiResponse::listing("Open orders", OrderList { items }, total))
}

/// The customer record behind a signed-in customer login.
async fn signed_in_customer(state: &AppState, actor: &Actor) -> AppResult<Customer> {
    let owner_id = LoginMapper::new(state)
        .find_customer(&actor.username)
        .await?
        .and_then(|login| login.owner_id);
    let customer = match owner_id {
        Some(id) => CustomerMapper::new(state).find_by_id(id).await?,
        None => None,
    };
    customer.ok_or_else(|| {
        tracing::warn!(actor = %actor.name, role = %actor.role, "checkout without a customer login");
        AppError::unauthorized(actor.name.clone())
    })
}

/// Builds an order for the signed-in customer from catalog item names and
/// stores it. Name, email and the payment on file come from the customer
/// record; a request payment replaces the one on file for this order.
pub async fn checkout(
    state: &AppState,
    actor: &Actor,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderView>> {
    let CheckoutRequest {
        customer_email,
        items,
        payment,
    } = payload;

    let customer = signed_in_customer(state, actor).await?;
    let mismatched = customer_email
        .as_deref()
        .is_some_and(|email| !email.eq_ignore_ascii_case(&customer.email_address));
    if mismatched {
        tracing::warn!(actor = %actor.name, "checkout for another customer's email");
        return Err(AppError::unauthorized(actor.name.clone()));
    }

    let catalog = ItemMapper::new(state);
    let mut cart = ShoppingCart::new();
    for name in &items {
        let item = catalog
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("unknown item '{name}'")))?;
        cart.add(item);
    }

    let customer_name = customer.full_name();
    let payment = match payment {
        Some(request) => build_payment(state, &customer_name, request)?,
        None => customer
            .payment
            .ok_or_else(|| AppError::BadRequest("no payment given and none on file".into()))?,
    };

    let mut order = OrderBuilder::new()
        .customer(customer_name, customer.email_address)
        .items(&cart)
        .payment(payment)
        .build()?;

    // Customers store their own orders without the administrator proxy.
    let number = order.submit(&state.sequences)?;
    let outcome = OrderMapper::new(state).add(&order).await?;
    stored(outcome, number, &actor.name)?;

    Ok(ApiResponse::ok("Order placed", OrderView::from(&order)))
}

fn build_payment(state: &AppState, owner: &str, request: PaymentRequest) -> AppResult<Payment> {
    let kind: PaymentType = request.payment_type.parse()?;
    let mut builder = PaymentBuilder::new().owner(owner).kind(kind);
    if let Some(location) = request.location {
        builder = builder.location(location.parse::<PaymentLocation>()?);
    }
    if let (Some(number), Some(expiration), Some(csv)) =
        (request.card_number, request.expiration, request.csv)
    {
        builder = builder.card(CardInfo::new(number, expiration, csv));
    }
    builder.build(&state.sequences)
}

pub async fn update_order_status(
    state: &AppState,
    actor: &Actor,
    number: i64,
    transition: OrderTransition,
) -> AppResult<ApiResponse<OrderView>> {
    let order = advance_order(state, actor, number, transition).await?;
    Ok(ApiResponse::ok("Order updated", OrderView::from(&order)))
}
