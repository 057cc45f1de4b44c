use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, SessionView, SignupRequest, SignupResponse},
        employees::{CreateEmployeeRequest, EmployeeList, EmployeeView},
        items::{CreateItemRequest, ItemList, ItemView, ToppingInput},
        orders::{CheckoutRequest, OrderList, OrderView, PaymentRequest, UpdateOrderStatusRequest},
    },
    response::{ApiResponse, Meta},
    routes::{auth, employees, health, items, orders, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::signup,
        auth::login,
        auth::logout,
        items::list_items,
        items::create_item,
        items::delete_item,
        orders::list_orders,
        orders::checkout,
        orders::update_order_status,
        employees::list_employees,
        employees::create_employee
    ),
    components(
        schemas(
            SignupRequest,
            SignupResponse,
            LoginRequest,
            LoginResponse,
            SessionView,
            CreateItemRequest,
            ToppingInput,
            ItemView,
            ItemList,
            CheckoutRequest,
            PaymentRequest,
            UpdateOrderStatusRequest,
            OrderView,
            OrderList,
            CreateEmployeeRequest,
            EmployeeView,
            EmployeeList,
            params::Pagination,
            Meta,
            ApiResponse<ItemView>,
            ApiResponse<ItemList>,
            ApiResponse<OrderView>,
            ApiResponse<OrderList>,
            ApiResponse<EmployeeList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Customer signup and session endpoints"),
        (name = "Items", description = "Catalog endpoints"),
        (name = "Orders", description = "Order placement and kitchen flow"),
        (name = "Employees", description = "Staff management"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
