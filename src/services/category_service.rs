use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use super::field_error;
use crate::database::manager::DatabaseManager;
use crate::database::models::category::{
    Category, CategoryNode, CategoryWithCount, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::error::ApiError;
use crate::listing::{bind_param_query_as, ParamBinder, SqlParam};

pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Flat listing of live categories, name order
    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE deleted_at IS NULL ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Nested listing for `?tree=true`
    pub async fn tree(&self) -> Result<Vec<CategoryNode>, ApiError> {
        let categories = self.list().await?;
        Ok(build_tree(categories))
    }

    /// Detail by UUID or slug, with its live product count
    pub async fn get(&self, reference: &str) -> Result<CategoryWithCount, ApiError> {
        let base = r#"
            SELECT c.*,
                   (SELECT COUNT(*) FROM products p
                    WHERE p.category_id = c.id AND p.deleted_at IS NULL) AS product_count
            FROM categories c
        "#;

        let category = match Uuid::parse_str(reference) {
            Ok(id) => {
                let sql = format!("{} WHERE c.id = $1 AND c.deleted_at IS NULL", base);
                sqlx::query_as::<_, CategoryWithCount>(&sql)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            Err(_) => {
                let sql = format!("{} WHERE c.slug = $1 AND c.deleted_at IS NULL", base);
                sqlx::query_as::<_, CategoryWithCount>(&sql)
                    .bind(reference)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        category.ok_or_else(|| ApiError::not_found("Category not found"))
    }

    pub async fn create(&self, request: &CreateCategoryRequest) -> Result<Category, ApiError> {
        let slug = match &request.slug {
            Some(slug) => slug.trim().to_string(),
            None => super::slugify(&request.name),
        };
        if slug.is_empty() {
            return Err(field_error(
                "slug",
                "a slug could not be derived from the name; provide one",
            ));
        }

        if let Some(parent_id) = request.parent_id {
            self.ensure_live(parent_id).await?;
        }

        self.ensure_slug_free(&slug, None).await?;

        let inserted = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.name.trim())
        .bind(&slug)
        .bind(&request.description)
        .bind(request.parent_id)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(category) => {
                tracing::info!(category_id = %category.id, slug = %category.slug, "created category");
                Ok(category)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                ApiError::conflict_code("SLUG_TAKEN", "Slug is already in use"),
            ),
            Err(other) => Err(other.into()),
        }
    }

    /// Partial update. Re-parenting runs the cycle check against the live
    /// hierarchy before anything is written.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateCategoryRequest,
    ) -> Result<Category, ApiError> {
        let current = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))?;

        if let Some(slug) = &request.slug {
            if slug.trim() != current.slug {
                self.ensure_slug_free(slug.trim(), Some(id)).await?;
            }
        }

        if let Some(Some(parent_id)) = request.parent_id {
            self.ensure_live(parent_id).await?;

            let parents = self.parent_map().await?;
            if would_create_cycle(id, parent_id, &parents) {
                return Err(ApiError::unprocessable_code(
                    "CATEGORY_CYCLE",
                    "Re-parenting would create a cycle in the category tree",
                ));
            }
        }

        let mut binder = ParamBinder::new();
        let mut sets: Vec<String> = vec![];

        if let Some(name) = &request.name {
            let ph = binder.push(SqlParam::Str(name.trim().to_string()));
            sets.push(format!("name = {}", ph));
        }
        if let Some(slug) = &request.slug {
            let ph = binder.push(SqlParam::Str(slug.trim().to_string()));
            sets.push(format!("slug = {}", ph));
        }
        if let Some(description) = &request.description {
            let ph = binder.push(SqlParam::Str(description.clone()));
            sets.push(format!("description = {}", ph));
        }
        match request.parent_id {
            None => {}
            Some(None) => sets.push("parent_id = NULL".to_string()),
            Some(Some(parent_id)) => {
                let ph = binder.push(SqlParam::Uuid(parent_id));
                sets.push(format!("parent_id = {}", ph));
            }
        }

        if sets.is_empty() {
            return Ok(current);
        }
        sets.push("updated_at = now()".to_string());

        let id_ph = binder.push(SqlParam::Uuid(id));
        let sql = format!(
            "UPDATE categories SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id_ph
        );

        let mut update_query = sqlx::query_as::<_, Category>(&sql);
        for param in &binder.into_values() {
            update_query = bind_param_query_as(update_query, param);
        }

        match update_query.fetch_one(&self.pool).await {
            Ok(category) => Ok(category),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                ApiError::conflict_code("SLUG_TAKEN", "Slug is already in use"),
            ),
            Err(other) => Err(other.into()),
        }
    }

    /// Soft delete. Refused while live products or live child categories
    /// still point here.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), ApiError> {
        let live_products = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE category_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if live_products {
            return Err(ApiError::conflict_code(
                "CATEGORY_IN_USE",
                "Category still has live products",
            ));
        }

        let live_children = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE parent_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if live_children {
            return Err(ApiError::conflict_code(
                "CATEGORY_IN_USE",
                "Category still has live child categories",
            ));
        }

        let result = sqlx::query(
            "UPDATE categories SET deleted_at = now(), updated_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Category not found"));
        }
        tracing::info!(category_id = %id, "soft-deleted category");
        Ok(())
    }

    pub async fn restore(&self, id: Uuid) -> Result<Category, ApiError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;

        if category.deleted_at.is_none() {
            return Ok(category);
        }

        self.ensure_slug_free(&category.slug, Some(id)).await?;

        let restored = sqlx::query_as::<_, Category>(
            "UPDATE categories SET deleted_at = NULL, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(category_id = %id, "restored category");
        Ok(restored)
    }

    async fn ensure_live(&self, id: Uuid) -> Result<(), ApiError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(field_error("parent_id", "parent category does not exist"));
        }
        Ok(())
    }

    async fn ensure_slug_free(&self, slug: &str, exclude: Option<Uuid>) -> Result<(), ApiError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND deleted_at IS NULL AND id IS DISTINCT FROM $2)",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        if taken {
            return Err(ApiError::conflict_code(
                "SLUG_TAKEN",
                "Slug is already in use",
            ));
        }
        Ok(())
    }

    /// id -> parent_id for every live category, for cycle checks
    async fn parent_map(&self) -> Result<HashMap<Uuid, Option<Uuid>>, ApiError> {
        let rows = sqlx::query_as::<_, (Uuid, Option<Uuid>)>(
            "SELECT id, parent_id FROM categories WHERE deleted_at IS NULL",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}

/// Walk up from the proposed parent; hitting the category being re-parented
/// means the move would close a loop. Self-parenting is the one-hop case.
fn would_create_cycle(
    category_id: Uuid,
    new_parent: Uuid,
    parents: &HashMap<Uuid, Option<Uuid>>,
) -> bool {
    let mut cursor = Some(new_parent);
    let mut hops = 0;

    while let Some(current) = cursor {
        if current == category_id {
            return true;
        }
        hops += 1;
        if hops > parents.len() {
            // Chain longer than the table can only mean corrupt data
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }

    false
}

/// Nest a flat, name-ordered category list. Children of soft-deleted parents
/// surface at the root so they stay reachable.
fn build_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();

    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();
    for category in categories {
        let key = category.parent_id.filter(|parent| ids.contains(parent));
        by_parent.entry(key).or_default().push(category);
    }

    fn take(
        parent: Option<Uuid>,
        by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>,
    ) -> Vec<CategoryNode> {
        let mut nodes = vec![];
        for category in by_parent.remove(&parent).unwrap_or_default() {
            let children = take(Some(category.id), by_parent);
            nodes.push(CategoryNode { category, children });
        }
        nodes
    }

    take(None, &mut by_parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(id: Uuid, name: &str, parent_id: Option<Uuid>) -> Category {
        Category {
            id,
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            parent_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_cycle_detection() {
        let root = Uuid::new_v4();
        let child = Uuid::new_v4();
        let grandchild = Uuid::new_v4();

        let parents: HashMap<Uuid, Option<Uuid>> = [
            (root, None),
            (child, Some(root)),
            (grandchild, Some(child)),
        ]
        .into_iter()
        .collect();

        // Moving the root under its own descendant closes a loop
        assert!(would_create_cycle(root, grandchild, &parents));
        assert!(would_create_cycle(root, child, &parents));
        // Self-parenting
        assert!(would_create_cycle(child, child, &parents));
        // Legal moves
        assert!(!would_create_cycle(grandchild, root, &parents));
        let sibling = Uuid::new_v4();
        let mut with_sibling = parents.clone();
        with_sibling.insert(sibling, Some(root));
        assert!(!would_create_cycle(child, sibling, &with_sibling));
    }

    #[test]
    fn test_build_tree_nests_children() {
        let root = Uuid::new_v4();
        let child_a = Uuid::new_v4();
        let child_b = Uuid::new_v4();
        let grandchild = Uuid::new_v4();

        let flat = vec![
            category(root, "Tools", None),
            category(child_a, "Hand Tools", Some(root)),
            category(child_b, "Power Tools", Some(root)),
            category(grandchild, "Trowels", Some(child_a)),
        ];

        let tree = build_tree(flat);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.id, root);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].category.id, child_a);
        assert_eq!(tree[0].children[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children[0].category.id, grandchild);
    }

    #[test]
    fn test_build_tree_orphans_surface_at_root() {
        let missing_parent = Uuid::new_v4();
        let orphan = Uuid::new_v4();

        let tree = build_tree(vec![category(orphan, "Stranded", Some(missing_parent))]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].category.id, orphan);
        assert!(tree[0].children.is_empty());
    }
}
