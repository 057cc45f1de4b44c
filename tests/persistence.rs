mod common;

use pizza_store::{
    error::AppError,
    mappers::{
        AddOutcome, CustomerMapper, CustomerPatch, ItemMapper, ItemPatch, Mapper, MenuMapper,
        MenuPatch, PaymentMapper, PaymentPatch, ToppingMapper, ToppingPatch,
    },
    models::{
        Breadstick, CardInfo, Customer, Drink, Item, ItemCategory, Menu, PaymentBuilder,
        PaymentLocation, PaymentType, Pizza, PizzaCrust, PizzaShape, PizzaState, Topping,
    },
    proxy::AccessProxy,
};

fn pepperoni_pizza() -> Item {
    Item::pizza(
        "Pepperoni",
        Pizza::new(1500)
            .with_crust(PizzaCrust::Thin)
            .with_shape(PizzaShape::Square)
            .with_toppings([Topping::new("Pepperoni", 150), Topping::new("Pepper", 75)]),
    )
    .with_description("Classic pie")
}

async fn count(state: &pizza_store::state::AppState, table: &str) -> anyhow::Result<i64> {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&state.pool)
        .await?;
    Ok(n)
}

#[tokio::test]
async fn pizza_reloads_with_its_toppings_and_price() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let items = AccessProxy::new(ItemMapper::new(&state), common::admin());

    let pizza = pepperoni_pizza();
    assert_eq!(pizza.price(), 1725);
    assert!(items.add(&pizza).await?.is_added());

    let stored = items.get(&pizza).await?.expect("stored pizza");
    assert_eq!(stored.category(), ItemCategory::Pizza);
    assert_eq!(stored.price(), 1725);
    assert_eq!(stored.description, "Classic pie");

    let reloaded = stored.as_pizza().expect("pizza kind");
    assert_eq!(reloaded.base_price(), 1500);
    assert_eq!(reloaded.crust, PizzaCrust::Thin);
    assert_eq!(reloaded.shape, PizzaShape::Square);
    assert!(reloaded.has_topping(&Topping::new("Pepperoni", 150)));
    assert!(reloaded.has_topping(&Topping::new("Pepper", 75)));

    let all = items.get_current().await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], stored);
    Ok(())
}

#[tokio::test]
async fn drinks_and_breadsticks_keep_their_details() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let items = ItemMapper::new(&state);

    items.add(&Item::drink("Cola", Drink::new(199, 20))).await?;
    items
        .add(&Item::breadstick(
            "Garlic Breadsticks",
            Breadstick::new(499, 6).with_sauce("Marinara"),
        ))
        .await?;
    items
        .add(&Item::breadstick("Plain Breadsticks", Breadstick::new(399, 4)))
        .await?;

    let cola = items.find_by_name("Cola").await?.expect("cola");
    let drink = cola.as_drink().expect("drink kind");
    assert_eq!(drink.price(), 199);
    assert_eq!(drink.ounces(), 20);
    assert_eq!(drink.ounces_left(), 20);

    let garlic = items.find_by_name("Garlic Breadsticks").await?.expect("garlic");
    let sticks = garlic.as_breadstick().expect("breadstick kind");
    assert_eq!(sticks.count(), 6);
    assert_eq!(sticks.sauce(), Some("Marinara"));

    let plain = items.find_by_name("Plain Breadsticks").await?.expect("plain");
    assert!(!plain.as_breadstick().expect("breadstick kind").has_sauce());

    let categories: Vec<_> = items.get_current().await?.iter().map(Item::category).collect();
    assert_eq!(
        categories,
        [ItemCategory::Drink, ItemCategory::Breadstick, ItemCategory::Breadstick]
    );
    Ok(())
}

#[tokio::test]
async fn duplicate_item_name_conflicts_without_extra_rows() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let items = ItemMapper::new(&state);

    assert!(items.add(&pepperoni_pizza()).await?.is_added());
    let again = items
        .add(&Item::pizza("Pepperoni", Pizza::new(900).with_toppings([Topping::new("Olive", 60)])))
        .await?;
    assert_eq!(again, AddOutcome::Conflict);

    assert_eq!(count(&state, "items").await?, 1);
    assert_eq!(count(&state, "pizzas").await?, 1);
    assert_eq!(count(&state, "pizza_toppings").await?, 2);
    // The clashing pizza's toppings never reach the catalog.
    assert_eq!(count(&state, "toppings").await?, 2);
    Ok(())
}

#[tokio::test]
async fn pizza_toppings_reuse_the_catalog() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let toppings = ToppingMapper::new(&state);
    toppings.add(&Topping::new("Pepperoni", 150)).await?;
    assert_eq!(toppings.add(&Topping::new("Pepperoni", 150)).await?, AddOutcome::Conflict);

    ItemMapper::new(&state).add(&pepperoni_pizza()).await?;

    let catalog = toppings.get_current().await?;
    assert_eq!(
        catalog,
        [Topping::new("Pepper", 75), Topping::new("Pepperoni", 150)]
    );
    Ok(())
}

#[tokio::test]
async fn pizza_with_a_repriced_catalog_topping_is_rejected() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    ToppingMapper::new(&state)
        .add(&Topping::new("Pepperoni", 100))
        .await?;

    let outcome = ItemMapper::new(&state).add(&pepperoni_pizza()).await?;
    assert_eq!(outcome, AddOutcome::Conflict);

    assert_eq!(count(&state, "items").await?, 0);
    assert_eq!(count(&state, "pizzas").await?, 0);
    assert_eq!(count(&state, "pizza_toppings").await?, 0);
    // "Pepper" was new but goes away with the rest of the item.
    assert_eq!(count(&state, "toppings").await?, 1);
    assert!(ItemMapper::new(&state).find_by_name("Pepperoni").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn pizza_listing_a_topping_twice_is_invalid() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let cheesy = Item::pizza(
        "Double Cheese",
        Pizza::new(1200).with_toppings([Topping::new("Cheese", 50), Topping::new("Cheese", 80)]),
    );

    let err = ItemMapper::new(&state).add(&cheesy).await;
    assert!(matches!(err, Err(AppError::Validation(_))));
    assert_eq!(count(&state, "items").await?, 0);
    assert_eq!(count(&state, "toppings").await?, 0);
    Ok(())
}

#[tokio::test]
async fn oversized_subtype_values_are_invalid() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let items = ItemMapper::new(&state);

    let vat = Item::drink("Vat", Drink::new(100, u32::MAX));
    assert!(matches!(items.add(&vat).await, Err(AppError::Validation(_))));
    let heap = Item::breadstick("Heap", Breadstick::new(100, i32::MAX as u32 + 1));
    assert!(matches!(items.add(&heap).await, Err(AppError::Validation(_))));
    assert_eq!(count(&state, "items").await?, 0);

    let jug = Item::drink("Jug", Drink::new(100, i32::MAX as u32));
    assert!(items.add(&jug).await?.is_added());
    Ok(())
}

#[tokio::test]
async fn item_edit_and_remove() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let items = AccessProxy::new(ItemMapper::new(&state), common::admin());
    let pizza = pepperoni_pizza();
    items.add(&pizza).await?;

    let patch = ItemPatch {
        description: Some("Spicy".into()),
        price: Some(1825),
        pizza_state: Some(PizzaState::Baked),
        ..Default::default()
    };
    assert!(items.edit(&pizza, patch).await?);

    let edited = items.get(&pizza).await?.expect("edited pizza");
    assert_eq!(edited.description, "Spicy");
    assert_eq!(edited.price(), 1825);
    let edited_pizza = edited.as_pizza().expect("pizza kind");
    assert_eq!(edited_pizza.base_price(), 1600);
    assert!(edited_pizza.is_baked());

    let missing = Item::drink("Root Beer", Drink::new(150, 12));
    assert!(!items.edit(&missing, ItemPatch::default()).await?);
    assert!(!items.remove(&missing).await?);

    assert!(items.remove(&pizza).await?);
    assert!(items.get(&pizza).await?.is_none());
    assert_eq!(count(&state, "pizzas").await?, 0);
    assert_eq!(count(&state, "pizza_toppings").await?, 0);
    Ok(())
}

#[tokio::test]
async fn topping_edit_renames_and_reprices() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let toppings = ToppingMapper::new(&state);
    let olive = Topping::new("Olive", 60);
    toppings.add(&olive).await?;

    let patch = ToppingPatch {
        name: Some("Black Olive".into()),
        price: Some(70),
    };
    assert!(toppings.edit(&olive, patch).await?);
    assert!(toppings.get(&olive).await?.is_none());
    assert_eq!(
        toppings.get(&Topping::new("Black Olive", 0)).await?,
        Some(Topping::new("Black Olive", 70))
    );

    assert!(toppings.remove(&Topping::new("Black Olive", 70)).await?);
    assert!(toppings.get_current().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn menus_link_known_items_and_parents() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let items = ItemMapper::new(&state);
    items.add(&pepperoni_pizza()).await?;
    items.add(&Item::drink("Cola", Drink::new(199, 20))).await?;

    let menus = AccessProxy::new(MenuMapper::new(&state), common::admin());
    let mut main = Menu::new("Main", "Everything we sell");
    main.add_item("Pepperoni");
    main.add_item("Calzone");
    assert!(menus.add(&main).await?.is_added());
    assert_eq!(menus.add(&main).await?, AddOutcome::Conflict);

    let drinks = Menu::new("Drinks", "Cold ones").with_parent("Main");
    menus.add(&drinks).await?;

    let stored = menus.find_by_name("Main").await?.expect("main menu");
    assert_eq!(stored.items, ["Pepperoni"]);
    assert_eq!(stored.parent, None);

    let patch = MenuPatch {
        add_items: vec!["Cola".into(), "Cola".into()],
        ..Default::default()
    };
    assert!(menus.edit(&drinks, patch).await?);
    let stored = menus.get(&drinks).await?.expect("drinks menu");
    assert_eq!(stored.parent.as_deref(), Some("Main"));
    assert_eq!(stored.items, ["Cola"]);

    let detach = MenuPatch {
        parent: Some(None),
        ..Default::default()
    };
    menus.edit(&drinks, detach).await?;
    assert_eq!(menus.get(&drinks).await?.expect("drinks").parent, None);

    assert!(menus.remove(&main).await?);
    assert_eq!(menus.get_current().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn customer_keeps_default_payment() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let card = PaymentBuilder::new()
        .owner("Sam Hill")
        .kind(PaymentType::Credit)
        .location(PaymentLocation::Online)
        .card(CardInfo::new("4111111111111111", "12/29", "123"))
        .build(&state.sequences)?;
    let customer = Customer::new("Sam", "Hill", "sam@example.com")
        .with_phone("555-0100")
        .with_payment(card.clone());

    let customers = AccessProxy::new(CustomerMapper::new(&state), common::admin());
    assert!(customers.add(&customer).await?.is_added());
    assert_eq!(
        customers
            .add(&Customer::new("Samuel", "Hill", "sam@example.com"))
            .await?,
        AddOutcome::Conflict
    );

    let stored = customers.get(&customer).await?.expect("customer");
    assert_eq!(stored.full_name(), "Sam Hill");
    assert_eq!(stored.phone_number.as_deref(), Some("555-0100"));
    assert_eq!(stored.payment.as_ref(), Some(&card));

    let cash = PaymentBuilder::new()
        .owner("Sam Hill")
        .kind(PaymentType::Cash)
        .build(&state.sequences)?;
    let patch = CustomerPatch {
        payment: Some(cash.clone()),
        ..Default::default()
    };
    assert!(customers.edit(&customer, patch).await?);
    let stored = customers.get(&customer).await?.expect("customer");
    assert_eq!(stored.payment.map(|p| p.kind()), Some(PaymentType::Cash));

    // Both payments stay on file.
    assert_eq!(PaymentMapper::new(&state).get_current().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn payment_lookup_matches_owner_and_type() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let payments = PaymentMapper::new(&state);

    let debit = PaymentBuilder::new()
        .owner("Sam Hill")
        .kind(PaymentType::Debit)
        .location(PaymentLocation::Store)
        .card(CardInfo::new("5500000000000004", "01/28", "999"))
        .build(&state.sequences)?;
    let check = PaymentBuilder::new()
        .owner("Sam Hill")
        .kind(PaymentType::Check)
        .build(&state.sequences)?;
    payments.add(&debit).await?;
    payments.add(&check).await?;
    assert_eq!(payments.add(&check).await?, AddOutcome::Conflict);

    let lookup = PaymentBuilder::new()
        .owner("Sam Hill")
        .kind(PaymentType::Debit)
        .location(PaymentLocation::Store)
        .card(CardInfo::new("0", "0", "0"))
        .build(&state.sequences)?;
    let found = payments.get(&lookup).await?.expect("debit on file");
    assert_eq!(found.number(), debit.number());
    assert_eq!(found.card().map(|c| c.number.as_str()), Some("5500000000000004"));

    let patch = PaymentPatch {
        owner: Some("Samantha Hill".into()),
        card: Some(CardInfo::new("1", "2", "3")),
    };
    assert!(payments.edit(&check, patch).await?);
    let renamed = payments.find_by_number(check.number()).await?.expect("check");
    assert_eq!(renamed.owner(), "Samantha Hill");
    assert!(renamed.card().is_none());

    assert!(payments.remove(&debit).await?);
    assert!(payments.find_by_number(debit.number()).await?.is_none());
    Ok(())
}
