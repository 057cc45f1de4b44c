use pizza_store::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    mappers::{
        AddOutcome, EmployeeMapper, ItemMapper, LoginMapper, Mapper, MenuMapper, ToppingMapper,
    },
    middleware::auth::Actor,
    models::{
        Breadstick, Drink, Employee, EmployeeRole, Item, Menu, Pizza, PizzaCrust, Role, Topping,
        UserLogin, UserType,
    },
    proxy::AccessProxy,
    services::auth_service::hash_password,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;
    let state = AppState::new(pool).await?;

    // Staff are stored straight through the mappers: there is no
    // administrator to act on behalf of until the first one exists.
    let staff = [
        ("Devon", "King", EmployeeRole::Administrator, "admin", "admin123"),
        ("Jordan", "King", EmployeeRole::Baker, "baker", "baker123"),
        ("Casey", "Moss", EmployeeRole::DeskWorker, "desk", "desk123"),
        ("Riley", "Park", EmployeeRole::Driver, "driver", "driver123"),
    ];
    for (first, last, role, username, password) in staff {
        ensure_employee(&state, Employee::new(first, last, role), username, password).await?;
    }

    let admin = Actor::new("admin", "Devon King", Role::Administrator);
    seed_toppings(&state, &admin).await?;
    seed_items(&state, &admin).await?;

    println!("Seed completed");
    Ok(())
}

async fn ensure_employee(
    state: &AppState,
    employee: Employee,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let employees = EmployeeMapper::new(state);
    let employee_id = match employees.add(&employee).await? {
        AddOutcome::Added(id) => id,
        AddOutcome::Conflict => employees
            .find_id(&employee)
            .await?
            .ok_or_else(|| anyhow::anyhow!("employee {} vanished", employee.full_name()))?,
    };

    let login = UserLogin::new(
        username,
        hash_password(password)?,
        UserType::Employee,
        Some(employee_id),
    );
    LoginMapper::new(state).add(&login).await?;

    println!("Ensured employee {} (login={username})", employee.full_name());
    Ok(())
}

async fn seed_toppings(state: &AppState, admin: &Actor) -> anyhow::Result<()> {
    let toppings = AccessProxy::new(ToppingMapper::new(state), admin.clone());
    let catalog = [
        ("Pepperoni", 150),
        ("Chicken", 250),
        ("Sausage", 125),
        ("Ham", 150),
        ("Bacon", 100),
        ("Pepper", 75),
        ("Cheese", 50),
        ("Pineapple", 75),
    ];
    for (name, price) in catalog {
        toppings.add(&Topping::new(name, price)).await?;
    }

    println!("Seeded toppings");
    Ok(())
}

async fn seed_items(state: &AppState, admin: &Actor) -> anyhow::Result<()> {
    let items = AccessProxy::new(ItemMapper::new(state), admin.clone());
    let menu_items = vec![
        Item::pizza(
            "Pepperoni Pizza",
            Pizza::new(1000).with_toppings([
                Topping::new("Pepperoni", 150),
                Topping::new("Cheese", 50),
            ]),
        )
        .with_description("Classic thick crust"),
        Item::pizza(
            "Hawaiian Pizza",
            Pizza::new(1100)
                .with_crust(PizzaCrust::Thin)
                .with_toppings([Topping::new("Ham", 150), Topping::new("Pineapple", 75)]),
        ),
        Item::drink("Cola", Drink::new(199, 20)),
        Item::breadstick("Garlic Breadsticks", Breadstick::new(499, 6).with_sauce("Marinara")),
    ];

    let mut menu = Menu::new("Main", "Everything we serve");
    for item in &menu_items {
        items.add(item).await?;
        menu.add_item(item.name.clone());
    }

    let menus = AccessProxy::new(MenuMapper::new(state), admin.clone());
    menus.add(&menu).await?;

    println!("Seeded items and menu");
    Ok(())
}
