//! In-memory driven-port adapters for end-to-end HTTP scenarios.
//!
//! Each store keeps rows in a `Vec` behind a mutex and hands out sequential
//! identifiers, mirroring the behaviour of the Diesel adapters closely enough
//! for the handlers and services to run unchanged.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sresta_backend::domain::ports::{
    CatalogRepository, CatalogRepositoryError, CouponRepository, CouponRepositoryError,
    OrderRepository, OrderRepositoryError, PartnerRepository, PartnerRepositoryError,
    PartnerScope, StatusUpdate, UserPersistenceError, UserRepository,
};
use sresta_backend::domain::{
    Coupon, CouponCode, CouponDraft, CouponId, DeliveryPartner, NewOrder, NewPartner, NewUser,
    Order, OrderId, OrderStatus, PartnerCredentials, PartnerId, PartnerLocation,
    Phone, Product, ProductDraft, ProductId, SavedAddress, User, UserCredentials, UserDraft,
    UserId, Variant, VariantDraft, VariantEdit, VariantId,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("in-memory store poisoned")
}

struct Table<T> {
    rows: Vec<T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    table: Mutex<Table<UserCredentials>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut table = lock(&self.table);
        if table.rows.iter().any(|row| row.user.phone() == &user.phone) {
            return Err(UserPersistenceError::conflict(format!(
                "phone {} already registered",
                user.phone
            )));
        }
        let created = User::new(UserDraft {
            id: UserId::new(table.allocate()),
            name: user.name.clone(),
            phone: user.phone.clone(),
            is_admin: false,
            addresses: Vec::new(),
            created_at: Utc::now(),
        });
        table.rows.push(UserCredentials {
            user: created.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|row| row.user.id() == id)
            .map(|row| row.user.clone()))
    }

    async fn find_credentials_by_phone(
        &self,
        phone: &Phone,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|row| row.user.phone() == phone)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .map(|row| row.user.clone())
            .collect())
    }

    async fn append_address(
        &self,
        id: UserId,
        address: &SavedAddress,
    ) -> Result<Option<Vec<SavedAddress>>, UserPersistenceError> {
        let mut table = lock(&self.table);
        let Some(row) = table.rows.iter_mut().find(|row| row.user.id() == id) else {
            return Ok(None);
        };
        let mut addresses = row.user.addresses().to_vec();
        addresses.push(address.clone());
        row.user = User::new(UserDraft {
            id,
            name: row.user.name().clone(),
            phone: row.user.phone().clone(),
            is_admin: row.user.is_admin(),
            addresses: addresses.clone(),
            created_at: row.user.created_at(),
        });
        Ok(Some(addresses))
    }
}

#[derive(Default)]
struct CatalogTables {
    products: Table<Product>,
    next_variant_id: i64,
}

impl CatalogTables {
    fn variant(&mut self, draft: &VariantDraft) -> Variant {
        self.next_variant_id += 1;
        Variant {
            id: VariantId::new(self.next_variant_id),
            label: draft.label().to_owned(),
            price: draft.price(),
        }
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    tables: Mutex<CatalogTables>,
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogRepositoryError> {
        Ok(lock(&self.tables).products.rows.clone())
    }

    async fn find_product(
        &self,
        id: ProductId,
    ) -> Result<Option<Product>, CatalogRepositoryError> {
        Ok(lock(&self.tables)
            .products
            .rows
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    async fn find_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, CatalogRepositoryError> {
        Ok(lock(&self.tables)
            .products
            .rows
            .iter()
            .filter(|product| ids.contains(&product.id))
            .cloned()
            .collect())
    }

    async fn create_product(
        &self,
        product: &ProductDraft,
        first_variant: Option<VariantDraft>,
    ) -> Result<Product, CatalogRepositoryError> {
        let mut tables = lock(&self.tables);
        let variants = first_variant
            .map(|draft| tables.variant(&draft))
            .into_iter()
            .collect();
        let created = Product {
            id: ProductId::new(tables.products.allocate()),
            name: product.name().to_owned(),
            description: product.description().to_owned(),
            category: product.category().to_owned(),
            image_url: product.image_url().map(str::to_owned),
            variants,
        };
        tables.products.rows.push(created.clone());
        Ok(created)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &ProductDraft,
        variants: Option<Vec<VariantEdit>>,
    ) -> Result<Option<Product>, CatalogRepositoryError> {
        let mut tables = lock(&self.tables);
        let Some(index) = tables.products.rows.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let replacement = variants.map(|edits| {
            edits
                .iter()
                .map(|edit| match edit.id {
                    Some(variant_id) => Variant {
                        id: variant_id,
                        label: edit.draft.label().to_owned(),
                        price: edit.draft.price(),
                    },
                    None => tables.variant(&edit.draft),
                })
                .collect::<Vec<_>>()
        });
        let stored = tables
            .products
            .rows
            .get_mut(index)
            .expect("index located above");
        stored.name = product.name().to_owned();
        stored.description = product.description().to_owned();
        stored.category = product.category().to_owned();
        stored.image_url = product.image_url().map(str::to_owned);
        if let Some(variants) = replacement {
            stored.variants = variants;
        }
        Ok(Some(stored.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, CatalogRepositoryError> {
        let mut tables = lock(&self.tables);
        let before = tables.products.rows.len();
        tables.products.rows.retain(|product| product.id != id);
        Ok(tables.products.rows.len() != before)
    }

    async fn create_variant(
        &self,
        product_id: ProductId,
        variant: &VariantDraft,
    ) -> Result<Option<Variant>, CatalogRepositoryError> {
        let mut tables = lock(&self.tables);
        if !tables.products.rows.iter().any(|p| p.id == product_id) {
            return Ok(None);
        }
        let created = tables.variant(variant);
        if let Some(product) = tables.products.rows.iter_mut().find(|p| p.id == product_id) {
            product.variants.push(created.clone());
        }
        Ok(Some(created))
    }

    async fn update_variant(
        &self,
        id: VariantId,
        variant: &VariantDraft,
    ) -> Result<Option<Variant>, CatalogRepositoryError> {
        let mut tables = lock(&self.tables);
        let found = tables
            .products
            .rows
            .iter_mut()
            .flat_map(|product| product.variants.iter_mut())
            .find(|stored| stored.id == id);
        Ok(found.map(|stored| {
            stored.label = variant.label().to_owned();
            stored.price = variant.price();
            stored.clone()
        }))
    }

    async fn delete_variant(&self, id: VariantId) -> Result<bool, CatalogRepositoryError> {
        let mut tables = lock(&self.tables);
        let mut removed = false;
        for product in &mut tables.products.rows {
            let before = product.variants.len();
            product.variants.retain(|variant| variant.id != id);
            removed |= product.variants.len() != before;
        }
        Ok(removed)
    }
}

#[derive(Default)]
pub struct InMemoryCoupons {
    table: Mutex<Table<Coupon>>,
}

#[async_trait]
impl CouponRepository for InMemoryCoupons {
    async fn find_by_code(
        &self,
        code: &CouponCode,
    ) -> Result<Option<Coupon>, CouponRepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|coupon| &coupon.code == code)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Coupon>, CouponRepositoryError> {
        Ok(lock(&self.table).rows.clone())
    }

    async fn list_active(&self, today: NaiveDate) -> Result<Vec<Coupon>, CouponRepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .filter(|coupon| !coupon.is_expired_on(today))
            .cloned()
            .collect())
    }

    async fn create(&self, coupon: &CouponDraft) -> Result<Coupon, CouponRepositoryError> {
        let mut table = lock(&self.table);
        if table.rows.iter().any(|row| row.code == coupon.code) {
            return Err(CouponRepositoryError::conflict(format!(
                "coupon {} already exists",
                coupon.code.as_ref()
            )));
        }
        let created = Coupon {
            id: CouponId::new(table.allocate()),
            code: coupon.code.clone(),
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            expiry_date: coupon.expiry_date,
            min_purchase_amount: coupon.min_purchase_amount,
            applicable_category: coupon.applicable_category.clone(),
            poster_url: coupon.poster_url.clone(),
            description: coupon.description.clone(),
        };
        table.rows.push(created.clone());
        Ok(created)
    }

    async fn delete_by_code(&self, code: &CouponCode) -> Result<bool, CouponRepositoryError> {
        let mut table = lock(&self.table);
        let before = table.rows.len();
        table.rows.retain(|coupon| &coupon.code != code);
        Ok(table.rows.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryOrders {
    table: Mutex<Table<Order>>,
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn insert(
        &self,
        order: &NewOrder,
        prior_orders: i64,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut table = lock(&self.table);
        let placed = table
            .rows
            .iter()
            .filter(|existing| existing.user_id == order.user_id)
            .count();
        if i64::try_from(placed).ok() != Some(prior_orders) {
            return Ok(None);
        }
        let created = Order {
            id: OrderId::new(table.allocate()),
            user_id: order.user_id,
            items: order.items.clone(),
            total_amount: order.total_amount,
            shipping_address: order.shipping_address.clone(),
            status: OrderStatus::Processing,
            delivery_type: order.delivery_type,
            partner_id: None,
            coupon_code: order.coupon_code.clone(),
            created_at: Utc::now(),
        };
        table.rows.push(created.clone());
        Ok(Some(created))
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<i64, OrderRepositoryError> {
        let count = lock(&self.table)
            .rows
            .iter()
            .filter(|order| order.user_id == user_id)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .rev()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        Ok(lock(&self.table).rows.iter().rev().cloned().collect())
    }

    async fn list_for_partner(
        &self,
        partner_id: PartnerId,
    ) -> Result<Vec<Order>, OrderRepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .rev()
            .filter(|order| order.partner_id == Some(partner_id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|order| order.id == id)
            .cloned())
    }

    async fn transition(
        &self,
        update: StatusUpdate,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut table = lock(&self.table);
        let Some(order) = table.rows.iter_mut().find(|order| {
            order.id == update.order_id
                && update.expected.contains(&order.status)
                && match update.partner {
                    PartnerScope::HeldBy(holder) => order.partner_id == Some(holder),
                    PartnerScope::Unchanged | PartnerScope::Assign(_) => true,
                }
        }) else {
            return Ok(None);
        };
        order.status = update.next;
        if let PartnerScope::Assign(partner_id) = update.partner {
            order.partner_id = Some(partner_id);
        }
        Ok(Some(order.clone()))
    }
}

#[derive(Default)]
pub struct InMemoryPartners {
    table: Mutex<Table<PartnerCredentials>>,
}

#[async_trait]
impl PartnerRepository for InMemoryPartners {
    async fn create(&self, partner: &NewPartner) -> Result<DeliveryPartner, PartnerRepositoryError> {
        let mut table = lock(&self.table);
        if table.rows.iter().any(|row| row.partner.phone == partner.phone) {
            return Err(PartnerRepositoryError::conflict(format!(
                "phone {} already registered",
                partner.phone
            )));
        }
        let created = DeliveryPartner {
            id: PartnerId::new(table.allocate()),
            name: partner.name.clone(),
            phone: partner.phone.clone(),
            is_available: true,
            current_location: None,
        };
        table.rows.push(PartnerCredentials {
            partner: created.clone(),
            password_hash: partner.password_hash.clone(),
        });
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<DeliveryPartner>, PartnerRepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .map(|row| row.partner.clone())
            .collect())
    }

    async fn find_by_id(
        &self,
        id: PartnerId,
    ) -> Result<Option<DeliveryPartner>, PartnerRepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|row| row.partner.id == id)
            .map(|row| row.partner.clone()))
    }

    async fn find_credentials_by_phone(
        &self,
        phone: &Phone,
    ) -> Result<Option<PartnerCredentials>, PartnerRepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|row| &row.partner.phone == phone)
            .cloned())
    }

    async fn set_availability(
        &self,
        id: PartnerId,
        is_available: bool,
    ) -> Result<Option<DeliveryPartner>, PartnerRepositoryError> {
        let mut table = lock(&self.table);
        Ok(table
            .rows
            .iter_mut()
            .find(|row| row.partner.id == id)
            .map(|row| {
                row.partner.is_available = is_available;
                row.partner.clone()
            }))
    }

    async fn update_location(
        &self,
        id: PartnerId,
        location: &PartnerLocation,
    ) -> Result<bool, PartnerRepositoryError> {
        let mut table = lock(&self.table);
        Ok(table
            .rows
            .iter_mut()
            .find(|row| row.partner.id == id)
            .map(|row| row.partner.current_location = Some(*location))
            .is_some())
    }
}
