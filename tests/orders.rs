mod common;

use pizza_store::{
    dto::orders::{CheckoutRequest, PaymentRequest},
    error::AppError,
    mappers::{CustomerMapper, ItemMapper, LoginMapper, Mapper, OrderMapper},
    models::{
        CardInfo, Customer, Drink, Item, Order, OrderBuilder, OrderStatus, OrderTransition,
        Payment, PaymentBuilder, PaymentLocation, PaymentType, Pizza, ShoppingCart, Topping,
        UserLogin, UserType,
    },
    proxy::AccessProxy,
    sequence::Sequences,
    services::order_service,
    state::AppState,
};

fn cash(sequences: &Sequences) -> Payment {
    PaymentBuilder::new()
        .owner("Sam Hill")
        .kind(PaymentType::Cash)
        .build(sequences)
        .expect("cash payment")
}

fn drink_cart() -> ShoppingCart {
    let mut cart = ShoppingCart::new();
    cart.add(Item::drink("Lemonade", Drink::new(150, 16)));
    cart
}

fn drink_order(sequences: &Sequences) -> Order {
    OrderBuilder::new()
        .customer("Sam Hill", "sam@example.com")
        .items(&drink_cart())
        .payment(cash(sequences))
        .build()
        .expect("order")
}

#[test]
fn build_requires_items_customer_and_payment() {
    let sequences = Sequences::default();

    let empty = OrderBuilder::new()
        .customer("Sam Hill", "sam@example.com")
        .items(&ShoppingCart::new())
        .payment(cash(&sequences))
        .build();
    assert!(matches!(empty, Err(AppError::Validation(_))));

    let no_payment = OrderBuilder::new()
        .customer("Sam Hill", "sam@example.com")
        .items(&drink_cart())
        .build();
    assert!(matches!(no_payment, Err(AppError::Validation(_))));

    let no_customer = OrderBuilder::new()
        .items(&drink_cart())
        .payment(cash(&sequences))
        .build();
    assert!(matches!(no_customer, Err(AppError::Validation(_))));
}

#[test]
fn drink_in_cart_builds_with_its_price() {
    let sequences = Sequences::default();
    let mut cart = ShoppingCart::new();

    let empty = OrderBuilder::new()
        .customer("Sam Hill", "sam@example.com")
        .items(&cart)
        .payment(cash(&sequences))
        .build();
    assert!(matches!(empty, Err(AppError::Validation(_))));

    cart.add(Item::drink("Lemonade", Drink::new(150, 16)));
    let order = OrderBuilder::new()
        .customer("Sam Hill", "sam@example.com")
        .items(&cart)
        .payment(cash(&sequences))
        .build()
        .expect("order with a drink");
    assert_eq!(order.subtotal(), 150);
    assert_eq!(order.status(), OrderStatus::NotSubmitted);

    // The order holds its own copy of the cart.
    cart.empty();
    assert_eq!(order.items().len(), 1);
    assert_eq!(order.items()[0].purchased(), 1);
}

#[test]
fn submit_returns_the_number_the_order_carries() {
    let sequences = Sequences::starting_at(7, 1);

    let mut first = drink_order(&sequences);
    let mut second = drink_order(&sequences);
    assert_eq!(first.number(), None);

    let number = first.submit(&sequences).expect("submit");
    assert_eq!(number, 7);
    assert_eq!(first.number(), Some(7));
    assert_eq!(first.status(), OrderStatus::Submitted);

    // Resubmitting keeps the number and does not consume another one.
    assert_eq!(first.submit(&sequences).expect("resubmit"), 7);
    assert_eq!(sequences.peek_order_number(), 8);

    assert_eq!(second.submit(&sequences).expect("submit"), 8);
    assert_eq!(sequences.peek_order_number(), 9);
}

#[test]
fn submit_does_not_count_purchases_twice() {
    let sequences = Sequences::default();
    let mut order = drink_order(&sequences);
    order.submit(&sequences).expect("submit");
    order.submit(&sequences).expect("resubmit");

    assert_eq!(order.subtotal(), 150);
    assert_eq!(order.items()[0].purchased(), 1);
}

#[test]
fn transitions_follow_the_kitchen_flow() {
    let sequences = Sequences::default();
    let mut order = drink_order(&sequences);

    let early = order.advance(OrderTransition::Acknowledge);
    assert!(matches!(early, Err(AppError::Validation(_))));

    order.submit(&sequences).expect("submit");
    let flow = [
        (OrderTransition::Acknowledge, OrderStatus::Acknowledged),
        (OrderTransition::Prepare, OrderStatus::Preparing),
        (OrderTransition::Finish, OrderStatus::Completed),
        (OrderTransition::Pickup, OrderStatus::Ready),
        (OrderTransition::Drive, OrderStatus::OnItsWay),
    ];
    for (transition, expected) in flow {
        assert_eq!(order.advance(transition).expect("advance"), expected);
    }

    let skipped = order.advance(OrderTransition::Prepare);
    assert!(matches!(skipped, Err(AppError::Validation(_))));
    assert!(order.submit(&sequences).is_err());
}

async fn stock_catalog(state: &AppState) -> anyhow::Result<()> {
    let items = ItemMapper::new(state);
    items
        .add(&Item::pizza(
            "Pepperoni Pizza",
            Pizza::new(1000).with_toppings([Topping::new("Pepperoni", 150)]),
        ))
        .await?;
    items.add(&Item::drink("Lemonade", Drink::new(150, 16))).await?;
    Ok(())
}

#[tokio::test]
async fn placed_order_is_stored_with_items_and_payment() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    stock_catalog(&state).await?;

    let pizza = ItemMapper::new(&state)
        .find_by_name("Pepperoni Pizza")
        .await?
        .expect("pizza in catalog");
    let mut cart = drink_cart();
    cart.add(pizza.clone());
    cart.add(pizza);

    let order = OrderBuilder::new()
        .customer("Sam Hill", "sam@example.com")
        .items(&cart)
        .payment(cash(&state.sequences))
        .build()?;
    let placed = order_service::place_order(&state, &common::admin(), order).await?;
    assert_eq!(placed.number(), Some(1));
    assert_eq!(placed.subtotal(), 150 + 1150 * 2);

    let stored = OrderMapper::new(&state)
        .find_by_number(1)
        .await?
        .expect("stored order");
    assert_eq!(stored.status(), OrderStatus::Submitted);
    assert_eq!(stored.items().len(), 3);
    assert_eq!(stored.subtotal(), placed.subtotal());
    assert_eq!(stored.payment().number(), placed.payment().number());
    assert_eq!(stored.payment().kind(), PaymentType::Cash);

    // Numbering carries over to a fresh state over the same storage.
    let reloaded = AppState::new(state.pool.clone()).await?;
    assert_eq!(reloaded.sequences.peek_order_number(), 2);
    Ok(())
}

#[tokio::test]
async fn order_for_unknown_items_skips_their_links() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let placed =
        order_service::place_order(&state, &common::admin(), drink_order(&state.sequences))
            .await?;
    let stored = OrderMapper::new(&state)
        .find_by_number(placed.number().expect("number"))
        .await?
        .expect("stored order");
    assert!(stored.items().is_empty());
    Ok(())
}

#[tokio::test]
async fn only_the_owning_role_advances_an_order() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    stock_catalog(&state).await?;

    let placed =
        order_service::place_order(&state, &common::admin(), drink_order(&state.sequences))
            .await?;
    let number = placed.number().expect("number");

    let denied =
        order_service::advance_order(&state, &common::baker(), number, OrderTransition::Acknowledge)
            .await;
    assert!(matches!(denied, Err(AppError::Unauthorized { ref actor }) if actor == "Jordan King"));

    let out_of_order =
        order_service::advance_order(&state, &common::baker(), number, OrderTransition::Prepare)
            .await;
    assert!(matches!(out_of_order, Err(AppError::Validation(_))));

    let steps = [
        (common::desk_worker(), OrderTransition::Acknowledge),
        (common::baker(), OrderTransition::Prepare),
        (common::baker(), OrderTransition::Finish),
        (common::driver(), OrderTransition::Pickup),
        (common::driver(), OrderTransition::Drive),
    ];
    for (actor, transition) in steps {
        let order = order_service::advance_order(&state, &actor, number, transition).await?;
        assert_eq!(order.status(), transition.to_status());
    }

    let stored = OrderMapper::new(&state).find_by_number(number).await?.expect("order");
    assert_eq!(stored.status(), OrderStatus::OnItsWay);

    let missing =
        order_service::advance_order(&state, &common::desk_worker(), 99, OrderTransition::Acknowledge)
            .await;
    assert!(matches!(missing, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn open_orders_drop_off_once_completed() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let first =
        order_service::place_order(&state, &common::admin(), drink_order(&state.sequences))
            .await?;
    order_service::place_order(&state, &common::admin(), drink_order(&state.sequences)).await?;

    let orders = AccessProxy::new(OrderMapper::new(&state), common::customer());
    assert_eq!(orders.get_current().await?.len(), 2);

    let number = first.number().expect("number");
    order_service::advance_order(&state, &common::desk_worker(), number, OrderTransition::Acknowledge)
        .await?;
    order_service::advance_order(&state, &common::baker(), number, OrderTransition::Prepare).await?;
    order_service::advance_order(&state, &common::baker(), number, OrderTransition::Finish).await?;

    let open = orders.get_current().await?;
    assert_eq!(open.len(), 1);
    assert_ne!(open[0].number(), Some(number));
    Ok(())
}

#[tokio::test]
async fn placing_the_same_order_twice_conflicts() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let placed =
        order_service::place_order(&state, &common::admin(), drink_order(&state.sequences))
            .await?;

    let again = order_service::place_order(&state, &common::admin(), placed).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn staff_other_than_an_administrator_cannot_place_orders() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    for actor in [common::desk_worker(), common::customer()] {
        let denied = order_service::place_order(&state, &actor, drink_order(&state.sequences)).await;
        assert!(matches!(denied, Err(AppError::Unauthorized { .. })));
    }

    let (orders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;
    let (payments,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
        .fetch_one(&state.pool)
        .await?;
    assert_eq!((orders, payments), (0, 0));
    Ok(())
}

/// Stores a customer with a credit card on file and a login for them.
async fn register_customer(
    state: &AppState,
    username: &str,
    first: &str,
    last: &str,
    email: &str,
) -> anyhow::Result<Payment> {
    let card = PaymentBuilder::new()
        .owner(format!("{first} {last}"))
        .kind(PaymentType::Credit)
        .location(PaymentLocation::Online)
        .card(CardInfo::new("4111111111111111", "12/29", "123"))
        .build(&state.sequences)?;
    let customer = Customer::new(first, last, email).with_payment(card.clone());
    let customer_id = CustomerMapper::new(state)
        .add(&customer)
        .await?
        .id()
        .expect("customer id");

    let login = UserLogin::new(username, "not-a-hash", UserType::Customer, Some(customer_id));
    assert!(LoginMapper::new(state).add(&login).await?.is_added());
    Ok(card)
}

fn checkout_request(email: Option<&str>, payment: Option<PaymentRequest>) -> CheckoutRequest {
    CheckoutRequest {
        customer_email: email.map(str::to_string),
        items: vec!["Lemonade".into()],
        payment,
    }
}

#[tokio::test]
async fn checkout_charges_the_signed_in_customer() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    stock_catalog(&state).await?;
    let card = register_customer(&state, "sam", "Sam", "Hill", "sam@example.com").await?;

    let resp = order_service::checkout(&state, &common::customer(), checkout_request(None, None))
        .await?;
    let view = resp.data.expect("order view");
    assert_eq!(view.customer_name, "Sam Hill");
    assert_eq!(view.customer_email, "sam@example.com");
    assert_eq!(view.payment_number, card.number());
    assert_eq!(view.subtotal, 150);

    let stored = OrderMapper::new(&state)
        .find_by_number(view.number.expect("number"))
        .await?
        .expect("stored order");
    assert_eq!(stored.status(), OrderStatus::Submitted);

    // A payment in the request is used for this order only.
    let cash = PaymentRequest {
        payment_type: "CASH".into(),
        location: None,
        card_number: None,
        expiration: None,
        csv: None,
    };
    let resp = order_service::checkout(
        &state,
        &common::customer(),
        checkout_request(Some("SAM@example.com"), Some(cash)),
    )
    .await?;
    assert_eq!(resp.data.expect("order view").payment_type, "CASH");
    Ok(())
}

#[tokio::test]
async fn checkout_rejects_another_customers_email() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    stock_catalog(&state).await?;
    register_customer(&state, "sam", "Sam", "Hill", "sam@example.com").await?;
    register_customer(&state, "vic", "Vic", "Tim", "victim@example.com").await?;

    let stolen = order_service::checkout(
        &state,
        &common::customer(),
        checkout_request(Some("victim@example.com"), None),
    )
    .await;
    assert!(matches!(stolen, Err(AppError::Unauthorized { ref actor }) if actor == "Sam Hill"));

    let (orders,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(orders, 0);
    Ok(())
}

#[tokio::test]
async fn checkout_needs_a_customer_login() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    stock_catalog(&state).await?;
    register_customer(&state, "sam", "Sam", "Hill", "sam@example.com").await?;

    for actor in [common::desk_worker(), common::admin()] {
        let denied = order_service::checkout(
            &state,
            &actor,
            checkout_request(Some("sam@example.com"), None),
        )
        .await;
        assert!(matches!(denied, Err(AppError::Unauthorized { .. })));
    }
    Ok(())
}
