use pizza_store::{
    error::AppError,
    models::{
        Breadstick, CardInfo, Drink, Item, Payment, PaymentBuilder, PaymentFactory,
        PaymentLocation, PaymentMethod, PaymentType, Pizza, PizzaState, ShoppingCart, Topping,
    },
    sequence::Sequences,
};

fn card() -> CardInfo {
    CardInfo::new("4111111111111111", "12/29", "123")
}

#[test]
fn pizza_price_tracks_topping_changes() {
    let pepperoni = Topping::new("Pepperoni", 150);
    let pepper = Topping::new("Pepper", 75);
    let mut pizza = Pizza::new(1500);
    assert_eq!(pizza.price(), 1500);

    pizza.add_toppings([pepperoni.clone(), pepper.clone()]);
    assert_eq!(pizza.price(), 1725);

    // Set semantics: adding the same topping again changes nothing.
    pizza.add_toppings([pepperoni.clone()]);
    assert_eq!(pizza.toppings().len(), 2);
    assert_eq!(pizza.price(), 1725);

    pizza.remove_toppings([&pepper]);
    assert!(!pizza.has_topping(&pepper));
    assert_eq!(pizza.price(), 1650);

    pizza.remove_all_toppings();
    assert_eq!(pizza.price(), pizza.base_price());
}

#[test]
fn pizza_state_is_a_single_field() {
    let mut pizza = Pizza::new(1000);
    assert_eq!(pizza.state(), PizzaState::None);
    assert!(!pizza.is_finished());

    pizza.prepare();
    assert!(pizza.is_prepared());
    pizza.bake();
    assert!(pizza.is_baked());
    assert!(!pizza.is_prepared());
    pizza.cut();
    pizza.boxed();
    assert!(pizza.is_boxed());
    assert!(pizza.is_finished());
}

#[test]
fn drink_stays_within_capacity() {
    let mut drink = Drink::new(199, 20);

    drink.drink(Some(8));
    assert_eq!(drink.ounces_left(), 12);
    assert!(!drink.is_drank());

    drink.drink(Some(50));
    assert_eq!(drink.ounces_left(), 0);
    assert!(drink.is_drank());

    drink.refill(Some(5));
    assert_eq!(drink.ounces_left(), 5);
    assert!(!drink.is_drank());

    drink.refill(Some(100));
    assert_eq!(drink.ounces_left(), 20);

    drink.drink(None);
    drink.refill(None);
    assert_eq!(drink.ounces_left(), drink.ounces());
}

#[test]
fn breadsticks_cannot_be_overeaten() {
    let mut sticks = Breadstick::new(499, 3);
    sticks.eat_breadsticks(Some(5));
    assert_eq!(sticks.count(), 3);

    sticks.eat_breadsticks(None);
    sticks.add_breadsticks(Some(4));
    assert_eq!(sticks.count(), 6);

    assert!(!sticks.has_sauce());
    sticks.add_sauce("Marinara");
    assert_eq!(sticks.sauce(), Some("Marinara"));
    sticks.remove_sauce();
    assert!(!sticks.has_sauce());
}

#[test]
fn purchase_and_remove_keep_count() {
    let mut item = Item::drink("Cola", Drink::new(150, 20));
    assert_eq!(item.purchase(Some(3)), 450);
    assert_eq!(item.purchased(), 3);

    assert_eq!(item.remove(Some(5)), 0);
    assert_eq!(item.purchased(), 3);
    assert_eq!(item.remove(None), 150);
    assert_eq!(item.purchased(), 2);
}

#[test]
fn purchase_count_stops_at_its_ceiling() {
    let mut item = Item::drink("Cola", Drink::new(150, 20));
    item.purchase(Some(u32::MAX));
    assert_eq!(item.purchase(Some(2)), 300);
    assert_eq!(item.purchased(), u32::MAX);
}

#[test]
fn cart_removes_first_matching_entry() {
    let cola = Item::drink("Cola", Drink::new(150, 20));
    let mut cart = ShoppingCart::new();
    cart.add(cola.clone());
    cart.add(cola.clone());

    assert!(cart.remove(&cola));
    assert_eq!(cart.len(), 1);
    cart.empty();
    assert!(cart.is_empty());
    assert!(!cart.remove(&cola));
}

#[test]
fn cash_and_check_are_always_in_store() {
    let sequences = Sequences::default();
    for kind in [PaymentType::Cash, PaymentType::Check] {
        let payment = PaymentBuilder::new()
            .owner("Sam Hill")
            .kind(kind)
            .card(card())
            .build(&sequences)
            .expect("cash-like payment");
        assert_eq!(payment.location(), PaymentLocation::Store);
        assert!(payment.card().is_none());
    }

    let online_cash = PaymentBuilder::new()
        .owner("Sam Hill")
        .kind(PaymentType::Cash)
        .location(PaymentLocation::Online)
        .build(&sequences);
    assert!(matches!(online_cash, Err(AppError::Validation(_))));

    // The factory ignores location for cash outright.
    let payment =
        PaymentFactory::create(PaymentType::Check, "Sam Hill", PaymentLocation::Online, None, 9)
            .expect("check payment");
    assert_eq!(payment.location(), PaymentLocation::Store);
}

#[test]
fn card_payments_require_card_info() {
    let sequences = Sequences::default();
    for kind in [PaymentType::Credit, PaymentType::Debit] {
        let missing = PaymentBuilder::new()
            .owner("Sam Hill")
            .kind(kind)
            .location(PaymentLocation::Online)
            .build(&sequences);
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let missing = PaymentFactory::create(kind, "Sam Hill", PaymentLocation::Store, None, 1);
        assert!(matches!(missing, Err(AppError::Validation(_))));
    }

    let payment = PaymentBuilder::new()
        .owner("Sam Hill")
        .kind(PaymentType::Credit)
        .location(PaymentLocation::Online)
        .card(card())
        .build(&sequences)
        .expect("credit payment");
    assert_eq!(payment.kind(), PaymentType::Credit);
    assert_eq!(payment.location(), PaymentLocation::Online);
    assert!(matches!(payment.method(), PaymentMethod::Credit { .. }));
}

#[test]
fn unknown_payment_tag_is_rejected() {
    let err = PaymentFactory::create_from_tag("BITCOIN", "Sam", PaymentLocation::Store, None, 1)
        .expect_err("unknown tag");
    assert!(matches!(err, AppError::InvalidPaymentType(tag) if tag == "BITCOIN"));

    assert!(matches!(PaymentType::try_from(7), Err(AppError::InvalidPaymentType(_))));
    assert_eq!("debit".parse::<PaymentType>().ok(), Some(PaymentType::Debit));
}

#[test]
fn payment_numbers_increase() {
    let sequences = Sequences::starting_at(1, 40);
    let first: Payment = PaymentBuilder::new()
        .owner("A")
        .kind(PaymentType::Cash)
        .build(&sequences)
        .expect("first");
    let second = PaymentBuilder::new()
        .owner("B")
        .kind(PaymentType::Cash)
        .build(&sequences)
        .expect("second");
    assert_eq!(first.number(), 40);
    assert_eq!(second.number(), 41);
}
