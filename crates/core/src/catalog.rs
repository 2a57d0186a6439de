//! Admin product and brand catalogs.
//!
//! Both catalogs start from seed data and persist under versioned storage
//! keys; bumping [`SEED_VERSION`] discards older stored copies.
//!
//! Brands do not touch products directly. Disabling a brand is a
//! [`CatalogCommand`] handled by [`Catalog`], which archives the brand's
//! products itself. Products name their brand by display name; the
//! [`BRAND_ALIASES`] table maps those names onto brand slugs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartProduct;
use crate::status::StatusUpdate;
use crate::storage::{SharedStore, StorageError, keys, load_versioned, save_versioned};
use crate::types::{BrandId, ProductId, ProductStatus, round_whole};

/// Version of the built-in seed data.
pub const SEED_VERSION: u32 = 2;

/// Product brand names and the brand slug each belongs to.
pub const BRAND_ALIASES: &[(&str, &str)] = &[
    ("Wagyu Shop", "wagyu-shop"),
    ("Mediterranean Estate", "mediterranean"),
    ("Taiwan Tea House", "taiwan-tea"),
    ("Alishan Tea", "taiwan-tea"),
    ("Hokkaido Farm", "hokkaido-farm"),
    ("Hokkaido Dairy", "hokkaido-farm"),
    ("French Patisserie", "french-sweets"),
    ("Italian Kitchen", "italian-food"),
    ("Organic Farm", "organic-farm"),
    ("Korean Taste", "korean-taste"),
    ("Thai Cuisine", "thai-cuisine"),
    ("German Craft", "german-craft"),
];

/// Product brand names that belong to `slug`.
#[must_use]
pub fn brand_names_for_slug(slug: &str) -> Vec<String> {
    BRAND_ALIASES
        .iter()
        .filter(|(_, s)| *s == slug)
        .map(|(name, _)| (*name).to_string())
        .collect()
}

/// SKU for the `index`-th seeded product: first six slug characters without
/// dashes, uppercased, plus a zero-padded sequence number.
#[must_use]
pub fn slug_to_sku(slug: &str, index: usize) -> String {
    let prefix: String = slug
        .chars()
        .filter(|c| *c != '-')
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("{prefix}-{index:03}")
}

fn placeholder_image(size: u32, name: &str, fallback: char) -> String {
    let initial = name.chars().next().unwrap_or(fallback);
    format!("https://placehold.co/{size}x{size}/E2E8F0/64748B?text={initial}")
}

// =============================================================================
// Products
// =============================================================================

/// A product as managed in the back-office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProduct {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Selling price (the sale price when the product is discounted).
    pub price: Decimal,
    /// List price before discount, when discounted.
    pub original_price: Option<Decimal>,
    pub cost: Decimal,
    pub stock: u32,
    pub sku: String,
    pub status: ProductStatus,
    pub category: String,
    /// Brand display name; see [`BRAND_ALIASES`].
    pub brand: String,
    pub image: Option<String>,
}

impl From<&AdminProduct> for CartProduct {
    fn from(product: &AdminProduct) -> Self {
        // A discounted product keeps its list price as the regular price
        let (price, sale_price) = product
            .original_price
            .map_or((product.price, None), |list| (list, Some(product.price)));
        Self {
            id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.image.clone(),
            price,
            sale_price,
            stock: Some(product.stock),
        }
    }
}

/// Fields for a new product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub cost: Decimal,
    pub stock: u32,
    pub sku: String,
    pub status: ProductStatus,
    pub category: String,
    pub brand: String,
    pub image: Option<String>,
}

/// Partial product update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
    pub status: Option<ProductStatus>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub image: Option<String>,
}

struct SeedProduct {
    id: i32,
    name: &'static str,
    slug: &'static str,
    price: i64,
    sale_price: Option<i64>,
    stock: u32,
    in_stock: bool,
    category: &'static str,
    brand: &'static str,
}

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct { id: 1, name: "A5 Wagyu Jerky", slug: "a5-wagyu-jerky", price: 1280, sale_price: Some(1080), stock: 40, in_stock: true, category: "Snacks", brand: "Wagyu Shop" },
    SeedProduct { id: 2, name: "Extra Virgin Olive Oil", slug: "extra-virgin-olive-oil", price: 890, sale_price: None, stock: 60, in_stock: true, category: "Seasonings", brand: "Mediterranean Estate" },
    SeedProduct { id: 3, name: "High Mountain Oolong", slug: "high-mountain-oolong", price: 650, sale_price: Some(520), stock: 80, in_stock: true, category: "Tea & Drinks", brand: "Alishan Tea" },
    SeedProduct { id: 4, name: "Honey Black Tea", slug: "honey-black-tea", price: 480, sale_price: None, stock: 55, in_stock: true, category: "Tea & Drinks", brand: "Taiwan Tea House" },
    SeedProduct { id: 5, name: "Milk Caramel Candy", slug: "milk-caramel-candy", price: 320, sale_price: None, stock: 120, in_stock: true, category: "Snacks", brand: "Hokkaido Dairy" },
    SeedProduct { id: 6, name: "Cheese Tart Box", slug: "cheese-tart-box", price: 560, sale_price: Some(499), stock: 30, in_stock: true, category: "Snacks", brand: "Hokkaido Farm" },
    SeedProduct { id: 7, name: "Macaron Gift Set", slug: "macaron-gift-set", price: 980, sale_price: None, stock: 0, in_stock: false, category: "Snacks", brand: "French Patisserie" },
    SeedProduct { id: 8, name: "Truffle Pasta Sauce", slug: "truffle-pasta-sauce", price: 420, sale_price: None, stock: 45, in_stock: true, category: "Seasonings", brand: "Italian Kitchen" },
    SeedProduct { id: 9, name: "Organic Quinoa", slug: "organic-quinoa", price: 360, sale_price: Some(300), stock: 70, in_stock: true, category: "Grains", brand: "Organic Farm" },
    SeedProduct { id: 10, name: "Seaweed Snack Pack", slug: "seaweed-snack-pack", price: 199, sale_price: None, stock: 150, in_stock: true, category: "Snacks", brand: "Korean Taste" },
    SeedProduct { id: 11, name: "Green Curry Paste", slug: "green-curry-paste", price: 260, sale_price: None, stock: 65, in_stock: true, category: "Seasonings", brand: "Thai Cuisine" },
    SeedProduct { id: 12, name: "Pretzel Crisps", slug: "pretzel-crisps", price: 240, sale_price: None, stock: 90, in_stock: true, category: "Snacks", brand: "German Craft" },
];

fn seed_products() -> Vec<AdminProduct> {
    SEED_PRODUCTS
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let list_price = Decimal::from(p.price);
            let price = p.sale_price.map_or(list_price, Decimal::from);
            AdminProduct {
                id: ProductId::new(p.id),
                name: p.name.to_string(),
                slug: p.slug.to_string(),
                description: String::new(),
                price,
                original_price: p.sale_price.map(|_| list_price),
                cost: round_whole(price * Decimal::new(5, 1)),
                stock: p.stock,
                sku: slug_to_sku(p.slug, i + 1),
                status: if p.in_stock {
                    ProductStatus::Active
                } else {
                    ProductStatus::Draft
                },
                category: p.category.to_string(),
                brand: p.brand.to_string(),
                image: Some(format!("/images/products/{}.jpg", p.slug)),
            }
        })
        .collect()
}

/// Admin product list bound to durable storage.
///
/// Every persisted change marks the catalog for a status push to the
/// shared status map; collect it with [`ProductCatalog::take_pending_sync`].
pub struct ProductCatalog {
    products: Vec<AdminProduct>,
    next_id: i32,
    pending_sync: bool,
    store: SharedStore,
}

impl ProductCatalog {
    /// Restore the stored catalog, or seed a fresh one.
    ///
    /// A freshly loaded catalog is marked for a status push so the shared
    /// map starts out complete.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn load(store: SharedStore) -> Result<Self, StorageError> {
        let products = load_versioned(
            &*store,
            keys::ADMIN_PRODUCTS,
            keys::ADMIN_PRODUCTS_VERSION,
            SEED_VERSION,
        )?
        .unwrap_or_else(seed_products);
        Ok(Self {
            next_id: next_id_after(&products),
            products,
            pending_sync: true,
            store,
        })
    }

    #[must_use]
    pub fn products(&self) -> &[AdminProduct] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&AdminProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn total_products(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn active_products(&self) -> usize {
        self.products
            .iter()
            .filter(|p| p.status == ProductStatus::Active)
            .count()
    }

    /// Add a product with the next free id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn create(&mut self, data: NewProduct) -> Result<AdminProduct, StorageError> {
        let id = ProductId::new(self.next_id);
        self.next_id += 1;
        let image = data
            .image
            .unwrap_or_else(|| placeholder_image(50, &data.name, 'N'));
        let product = AdminProduct {
            id,
            name: data.name,
            slug: data.slug,
            description: data.description,
            price: data.price,
            original_price: data.original_price,
            cost: data.cost,
            stock: data.stock,
            sku: data.sku,
            status: data.status,
            category: data.category,
            brand: data.brand,
            image: Some(image),
        };
        self.products.push(product.clone());
        self.persist()?;
        Ok(product)
    }

    /// Apply a partial update. Returns the updated product, or `None` for an
    /// unknown id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn update(
        &mut self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<AdminProduct>, StorageError> {
        let Some(product) = self.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(status) = patch.status {
            product.status = status;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(brand) = patch.brand {
            product.brand = brand;
        }
        if let Some(image) = patch.image {
            product.image = Some(image);
        }
        let updated = product.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    /// Remove a product. Returns `false` for an unknown id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn delete(&mut self, id: ProductId) -> Result<bool, StorageError> {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        if self.products.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Flip a product between active and archived.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn toggle_status(&mut self, id: ProductId) -> Result<Option<ProductStatus>, StorageError> {
        let Some(product) = self.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.status = product.status.toggled();
        let status = product.status;
        self.persist()?;
        Ok(Some(status))
    }

    /// Set `status` on every product whose brand is one of `brand_names`.
    ///
    /// Persists and returns `true` only if some product actually changed,
    /// so repeating the same call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn set_brand_products_status(
        &mut self,
        brand_names: &[String],
        status: ProductStatus,
    ) -> Result<bool, StorageError> {
        let mut changed = false;
        for product in &mut self.products {
            if product.status != status && brand_names.iter().any(|b| *b == product.brand) {
                product.status = status;
                changed = true;
            }
        }
        if changed {
            self.persist()?;
        }
        Ok(changed)
    }

    /// Restore the seed data.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.products = seed_products();
        self.next_id = next_id_after(&self.products);
        self.persist()
    }

    /// Number of products carrying each brand name.
    #[must_use]
    pub fn count_for_brand_names(&self, brand_names: &[String]) -> usize {
        self.products
            .iter()
            .filter(|p| brand_names.iter().any(|b| *b == p.brand))
            .count()
    }

    /// Current status of every product, for the shared status map.
    #[must_use]
    pub fn status_snapshot(&self) -> Vec<StatusUpdate> {
        self.products
            .iter()
            .map(|p| StatusUpdate::new(p.id, p.status))
            .collect()
    }

    /// Return the status snapshot if a push is due, clearing the mark.
    pub fn take_pending_sync(&mut self) -> Option<Vec<StatusUpdate>> {
        if !self.pending_sync {
            return None;
        }
        self.pending_sync = false;
        Some(self.status_snapshot())
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        save_versioned(
            &*self.store,
            keys::ADMIN_PRODUCTS,
            keys::ADMIN_PRODUCTS_VERSION,
            SEED_VERSION,
            &self.products,
        )?;
        self.pending_sync = true;
        Ok(())
    }
}

fn next_id_after(products: &[AdminProduct]) -> i32 {
    products.iter().map(|p| p.id.as_i32()).max().unwrap_or(0) + 1
}

// =============================================================================
// Brands
// =============================================================================

/// A brand as managed in the back-office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: String,
    pub logo: String,
    pub active: bool,
    pub description: String,
    pub product_count: usize,
}

/// Fields for a new brand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBrand {
    pub name: String,
    pub slug: String,
    pub description: String,
}

/// Partial brand update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

const SEED_BRANDS: &[(i32, &str, &str)] = &[
    (1, "Wagyu Shop", "wagyu-shop"),
    (2, "Mediterranean Estate", "mediterranean"),
    (3, "Taiwan Tea House", "taiwan-tea"),
    (4, "Hokkaido Farm", "hokkaido-farm"),
    (5, "French Patisserie", "french-sweets"),
    (6, "Italian Kitchen", "italian-food"),
    (7, "Organic Farm", "organic-farm"),
    (8, "Korean Taste", "korean-taste"),
    (9, "Thai Cuisine", "thai-cuisine"),
    (10, "German Craft", "german-craft"),
];

fn seed_brands(products: &ProductCatalog) -> Vec<Brand> {
    SEED_BRANDS
        .iter()
        .map(|&(id, name, slug)| Brand {
            id: BrandId::new(id),
            name: name.to_string(),
            slug: slug.to_string(),
            logo: placeholder_image(40, name, 'B'),
            active: true,
            description: String::new(),
            product_count: products.count_for_brand_names(&brand_names_for_slug(slug)),
        })
        .collect()
}

/// Admin brand list bound to durable storage.
pub struct BrandCatalog {
    brands: Vec<Brand>,
    store: SharedStore,
}

impl BrandCatalog {
    /// Restore the stored brands, or seed them (counting seeded products).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn load(store: SharedStore, products: &ProductCatalog) -> Result<Self, StorageError> {
        let brands = load_versioned(
            &*store,
            keys::ADMIN_BRANDS,
            keys::ADMIN_BRANDS_VERSION,
            SEED_VERSION,
        )?
        .unwrap_or_else(|| seed_brands(products));
        Ok(Self { brands, store })
    }

    #[must_use]
    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    #[must_use]
    pub fn get(&self, id: BrandId) -> Option<&Brand> {
        self.brands.iter().find(|b| b.id == id)
    }

    /// Add an active brand with the next free id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn create(&mut self, data: NewBrand) -> Result<Brand, StorageError> {
        let id = self.brands.iter().map(|b| b.id.as_i32()).max().unwrap_or(0) + 1;
        let brand = Brand {
            id: BrandId::new(id),
            logo: placeholder_image(40, &data.name, 'N'),
            name: data.name,
            slug: data.slug,
            active: true,
            description: data.description,
            product_count: 0,
        };
        self.brands.push(brand.clone());
        self.persist()?;
        Ok(brand)
    }

    /// Apply a partial update. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn update(&mut self, id: BrandId, patch: BrandPatch) -> Result<Option<Brand>, StorageError> {
        let Some(brand) = self.brands.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            brand.name = name;
        }
        if let Some(slug) = patch.slug {
            brand.slug = slug;
        }
        if let Some(description) = patch.description {
            brand.description = description;
        }
        let updated = brand.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    /// Flip a brand's active flag. Returns the updated brand.
    ///
    /// Only the brand changes here; see [`Catalog::apply`] for the product
    /// side effect.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn toggle_active(&mut self, id: BrandId) -> Result<Option<Brand>, StorageError> {
        let Some(brand) = self.brands.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        brand.active = !brand.active;
        let updated = brand.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    fn persist(&self) -> Result<(), StorageError> {
        save_versioned(
            &*self.store,
            keys::ADMIN_BRANDS,
            keys::ADMIN_BRANDS_VERSION,
            SEED_VERSION,
            &self.brands,
        )
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Changes that may span both catalogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCommand {
    /// Flip a product between active and archived.
    ToggleProduct(ProductId),
    /// Flip a brand and set its products to match.
    ToggleBrand(BrandId),
    /// Set the status of every product under the given brand names.
    SetBrandProductsStatus {
        brand_names: Vec<String>,
        status: ProductStatus,
    },
}

/// What a [`CatalogCommand`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    ProductToggled(ProductStatus),
    BrandToggled { active: bool, products_changed: bool },
    ProductsUpdated(bool),
    /// The referenced product or brand does not exist.
    NotFound,
}

/// Owns both catalogs and routes commands between them.
pub struct Catalog {
    products: ProductCatalog,
    brands: BrandCatalog,
}

impl Catalog {
    /// Load both catalogs from `store`.
    ///
    /// Loading does not sync disabled brands; call
    /// [`Catalog::sync_disabled_brands`] once the catalog is up.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either catalog cannot be read.
    pub fn load(store: SharedStore) -> Result<Self, StorageError> {
        let products = ProductCatalog::load(store.clone())?;
        let brands = BrandCatalog::load(store, &products)?;
        Ok(Self { products, brands })
    }

    #[must_use]
    pub const fn products(&self) -> &ProductCatalog {
        &self.products
    }

    pub const fn products_mut(&mut self) -> &mut ProductCatalog {
        &mut self.products
    }

    #[must_use]
    pub const fn brands(&self) -> &BrandCatalog {
        &self.brands
    }

    pub const fn brands_mut(&mut self) -> &mut BrandCatalog {
        &mut self.brands
    }

    /// Execute a command.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting either catalog fails.
    pub fn apply(&mut self, command: CatalogCommand) -> Result<CommandOutcome, StorageError> {
        match command {
            CatalogCommand::ToggleProduct(id) => Ok(self
                .products
                .toggle_status(id)?
                .map_or(CommandOutcome::NotFound, CommandOutcome::ProductToggled)),
            CatalogCommand::ToggleBrand(id) => {
                let Some(brand) = self.brands.toggle_active(id)? else {
                    return Ok(CommandOutcome::NotFound);
                };
                let status = if brand.active {
                    ProductStatus::Active
                } else {
                    ProductStatus::Archived
                };
                let names = brand_names_for_slug(&brand.slug);
                let products_changed = if names.is_empty() {
                    false
                } else {
                    self.apply(CatalogCommand::SetBrandProductsStatus {
                        brand_names: names,
                        status,
                    })? == CommandOutcome::ProductsUpdated(true)
                };
                tracing::info!(
                    brand = %brand.slug,
                    active = brand.active,
                    products_changed,
                    "Brand toggled"
                );
                Ok(CommandOutcome::BrandToggled {
                    active: brand.active,
                    products_changed,
                })
            }
            CatalogCommand::SetBrandProductsStatus {
                brand_names,
                status,
            } => Ok(CommandOutcome::ProductsUpdated(
                self.products.set_brand_products_status(&brand_names, status)?,
            )),
        }
    }

    /// Archive the products of every inactive brand.
    ///
    /// Idempotent: once products are archived, further calls change nothing
    /// and return `false`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub fn sync_disabled_brands(&mut self) -> Result<bool, StorageError> {
        let disabled: Vec<Vec<String>> = self
            .brands
            .brands()
            .iter()
            .filter(|b| !b.active)
            .map(|b| brand_names_for_slug(&b.slug))
            .filter(|names| !names.is_empty())
            .collect();

        let mut changed = false;
        for brand_names in disabled {
            changed |= self
                .products
                .set_brand_products_status(&brand_names, ProductStatus::Archived)?;
        }
        Ok(changed)
    }
}
