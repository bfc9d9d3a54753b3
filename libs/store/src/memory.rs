//! In-memory store adapter
//!
//! Implements the same contract as the PostgreSQL adapter on top of plain
//! maps guarded by a single lock. Checks and writes that must be atomic run
//! under one write guard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{StoreError, StoreResult},
    integrity::{AUTHOR_REFERENCES, Reference, ReferenceCounter, USER_REFERENCES, check_all},
    models::{
        Author, AuthorPatch, AuthorProfile, Category, Ingredient, NewAuthor, NewRecipe,
        NewSession, NewUser, PrepStep, Recipe, RecipePatch, Session, User, UserPatch,
        UserSnapshot, next_modified, parse_id, require_key,
    },
    pagination::{FindOptions, Pagination, SortKey},
    store::Store,
};

struct StoredAuthor {
    profile: AuthorProfile,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

struct StoredRecipe {
    id: Uuid,
    name: String,
    image_name: String,
    recipe_url: String,
    time_m: i32,
    category: Category,
    ingredients: Vec<Ingredient>,
    prep_steps: Vec<PrepStep>,
    author_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

struct StoredSession {
    id: Uuid,
    user_id: Uuid,
    refresh_token: String,
    user_agent: String,
    client_ip: String,
    is_blocked: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

/// Records held by a [`MemoryStore`]
#[derive(Default)]
pub struct MemoryState {
    users: HashMap<Uuid, User>,
    authors: HashMap<Uuid, StoredAuthor>,
    recipes: HashMap<Uuid, StoredRecipe>,
    sessions: HashMap<Uuid, StoredSession>,
}

impl MemoryState {
    fn user_snapshot(&self, user_id: Uuid) -> Option<UserSnapshot> {
        self.users.get(&user_id).map(User::snapshot)
    }

    fn author(&self, stored: &StoredAuthor) -> Author {
        Author {
            profile: stored.profile.clone(),
            created_at: stored.created_at,
            modified_at: stored.modified_at,
            user_created: self.user_snapshot(stored.user_id),
        }
    }

    fn recipe(&self, stored: &StoredRecipe) -> Recipe {
        Recipe {
            id: stored.id,
            name: stored.name.clone(),
            image_name: stored.image_name.clone(),
            recipe_url: stored.recipe_url.clone(),
            time_m: stored.time_m,
            category: stored.category,
            ingredients: stored.ingredients.clone(),
            prep_steps: stored.prep_steps.clone(),
            created_at: stored.created_at,
            modified_at: stored.modified_at,
            author: self
                .authors
                .get(&stored.author_id)
                .map(|author| author.profile.clone()),
            user_created: self.user_snapshot(stored.user_id),
        }
    }

    fn session(&self, stored: &StoredSession) -> Session {
        Session {
            id: stored.id,
            refresh_token: stored.refresh_token.clone(),
            user_agent: stored.user_agent.clone(),
            client_ip: stored.client_ip.clone(),
            is_blocked: stored.is_blocked,
            expires_at: stored.expires_at,
            created_at: stored.created_at,
            user: self.user_snapshot(stored.user_id),
        }
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }

    fn author_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.authors
            .values()
            .any(|author| author.profile.name == name && Some(author.profile.id) != except)
    }

    fn recipe_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.recipes
            .values()
            .any(|recipe| recipe.name == name && Some(recipe.id) != except)
    }
}

#[async_trait]
impl ReferenceCounter for MemoryState {
    async fn count_references(&mut self, reference: Reference, target: Uuid) -> StoreResult<i64> {
        let count = match reference {
            Reference::RecipeAuthor => self
                .recipes
                .values()
                .filter(|recipe| recipe.author_id == target)
                .count(),
            Reference::RecipeUser => self
                .recipes
                .values()
                .filter(|recipe| recipe.user_id == target)
                .count(),
            Reference::AuthorUser => self
                .authors
                .values()
                .filter(|author| author.user_id == target)
                .count(),
        };
        Ok(count as i64)
    }
}

/// Sort `items` ascending by key, ties by id, and cut out the requested page
fn page<T>(mut items: Vec<(String, Uuid, T)>, options: FindOptions) -> Vec<T> {
    items.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
    let limit = usize::try_from(options.limit).unwrap_or(usize::MAX);

    items
        .into_iter()
        .skip(skip)
        .take(limit)
        .map(|(_, _, item)| item)
        .collect()
}

/// Store keeping every record in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<Uuid> {
        require_key("user", "email", &user.email)?;

        let mut state = self.state.write().await;
        if state.email_taken(&user.email, None) {
            return Err(StoreError::Conflict(format!(
                "user with email {} already exists",
                user.email
            )));
        }

        let id = Uuid::now_v7();
        let now = Utc::now();
        state.users.insert(
            id,
            User {
                id,
                email: user.email,
                password_hash: user.password_hash,
                role: user.role,
                is_active: user.is_active,
                created_at: now,
                modified_at: now,
            },
        );

        info!("Created user {}", id);
        Ok(id)
    }

    async fn get_all_users(&self, pagination: Pagination) -> StoreResult<Vec<User>> {
        let options = pagination.find_options(SortKey::Email)?;

        let state = self.state.read().await;
        let items = state
            .users
            .values()
            .map(|user| (user.email.clone(), user.id, user.clone()))
            .collect();

        Ok(page(items, options))
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<User> {
        let state = self.state.read().await;
        state
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", "email", email))
    }

    async fn get_user_by_id(&self, id: &str) -> StoreResult<User> {
        let user_id = parse_id("user", id)?;

        let state = self.state.read().await;
        state
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", "id", id))
    }

    async fn update_user_by_id(&self, id: &str, patch: UserPatch) -> StoreResult<u64> {
        let user_id = parse_id("user", id)?;
        if let Some(email) = &patch.email {
            require_key("user", "email", email)?;
        }

        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            warn!("No user {} to update", user_id);
            return Ok(0);
        }
        if let Some(email) = &patch.email {
            if state.email_taken(email, Some(user_id)) {
                return Err(StoreError::Conflict(
                    "a user with this email already exists".to_string(),
                ));
            }
        }

        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(0);
        };

        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        user.modified_at = next_modified(user.modified_at);

        Ok(1)
    }

    async fn delete_user_by_id(&self, id: &str) -> StoreResult<u64> {
        let user_id = parse_id("user", id)?;

        let mut state = self.state.write().await;
        check_all(&mut *state, USER_REFERENCES, user_id).await?;

        let deleted = state.users.remove(&user_id).is_some();
        if deleted {
            info!("Deleted user {}", user_id);
        }
        Ok(u64::from(deleted))
    }

    async fn create_author(&self, author: NewAuthor) -> StoreResult<Uuid> {
        require_key("author", "name", &author.name)?;

        let mut state = self.state.write().await;
        if state.author_name_taken(&author.name, None) {
            return Err(StoreError::Conflict(format!(
                "author with name {} already exists",
                author.name
            )));
        }

        let id = Uuid::now_v7();
        let now = Utc::now();
        state.authors.insert(
            id,
            StoredAuthor {
                profile: AuthorProfile {
                    id,
                    name: author.name,
                    first_name: author.first_name,
                    last_name: author.last_name,
                    website_url: author.website_url,
                    instagram_url: author.instagram_url,
                    youtube_url: author.youtube_url,
                    image_name: author.image_name,
                },
                user_id: author.user_id,
                created_at: now,
                modified_at: now,
            },
        );

        info!("Created author {}", id);
        Ok(id)
    }

    async fn get_all_authors(&self, pagination: Pagination) -> StoreResult<Vec<Author>> {
        let options = pagination.find_options(SortKey::Name)?;

        let state = self.state.read().await;
        let items = state
            .authors
            .values()
            .map(|author| {
                (
                    author.profile.name.clone(),
                    author.profile.id,
                    state.author(author),
                )
            })
            .collect();

        Ok(page(items, options))
    }

    async fn get_author_by_id(&self, id: &str) -> StoreResult<Author> {
        let author_id = parse_id("author", id)?;

        let state = self.state.read().await;
        state
            .authors
            .get(&author_id)
            .map(|author| state.author(author))
            .ok_or_else(|| StoreError::not_found("author", "id", id))
    }

    async fn update_author_by_id(&self, id: &str, patch: AuthorPatch) -> StoreResult<u64> {
        let author_id = parse_id("author", id)?;
        if let Some(name) = &patch.name {
            require_key("author", "name", name)?;
        }

        let mut state = self.state.write().await;
        if !state.authors.contains_key(&author_id) {
            warn!("No author {} to update", author_id);
            return Ok(0);
        }
        if let Some(name) = &patch.name {
            if state.author_name_taken(name, Some(author_id)) {
                return Err(StoreError::Conflict(
                    "an author with this name already exists".to_string(),
                ));
            }
        }

        let Some(author) = state.authors.get_mut(&author_id) else {
            return Ok(0);
        };

        patch.apply(&mut author.profile);
        author.modified_at = next_modified(author.modified_at);

        Ok(1)
    }

    async fn delete_author_by_id(&self, id: &str) -> StoreResult<u64> {
        let author_id = parse_id("author", id)?;

        let mut state = self.state.write().await;
        check_all(&mut *state, AUTHOR_REFERENCES, author_id).await?;

        let deleted = state.authors.remove(&author_id).is_some();
        if deleted {
            info!("Deleted author {}", author_id);
        }
        Ok(u64::from(deleted))
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> StoreResult<Uuid> {
        require_key("recipe", "name", &recipe.name)?;

        let mut state = self.state.write().await;
        if state.recipe_name_taken(&recipe.name, None) {
            return Err(StoreError::Conflict(format!(
                "recipe with name {} already exists",
                recipe.name
            )));
        }

        let id = Uuid::now_v7();
        let now = Utc::now();
        state.recipes.insert(
            id,
            StoredRecipe {
                id,
                name: recipe.name,
                image_name: recipe.image_name,
                recipe_url: recipe.recipe_url,
                time_m: recipe.time_m,
                category: recipe.category,
                ingredients: recipe.ingredients,
                prep_steps: PrepStep::ranked(recipe.prep_steps),
                author_id: recipe.author_id,
                user_id: recipe.user_id,
                created_at: now,
                modified_at: now,
            },
        );

        info!("Created recipe {}", id);
        Ok(id)
    }

    async fn get_all_recipes(&self, pagination: Pagination) -> StoreResult<Vec<Recipe>> {
        let options = pagination.find_options(SortKey::Name)?;

        let state = self.state.read().await;
        let items = state
            .recipes
            .values()
            .map(|recipe| (recipe.name.clone(), recipe.id, state.recipe(recipe)))
            .collect();

        Ok(page(items, options))
    }

    async fn get_recipe_by_id(&self, id: &str) -> StoreResult<Recipe> {
        let recipe_id = parse_id("recipe", id)?;

        let state = self.state.read().await;
        state
            .recipes
            .get(&recipe_id)
            .map(|recipe| state.recipe(recipe))
            .ok_or_else(|| StoreError::not_found("recipe", "id", id))
    }

    async fn update_recipe_by_id(&self, id: &str, patch: RecipePatch) -> StoreResult<u64> {
        let recipe_id = parse_id("recipe", id)?;
        if let Some(name) = &patch.name {
            require_key("recipe", "name", name)?;
        }

        let mut state = self.state.write().await;
        if !state.recipes.contains_key(&recipe_id) {
            warn!("No recipe {} to update", recipe_id);
            return Ok(0);
        }
        if let Some(name) = &patch.name {
            if state.recipe_name_taken(name, Some(recipe_id)) {
                return Err(StoreError::Conflict(
                    "a recipe with this name already exists".to_string(),
                ));
            }
        }

        let Some(recipe) = state.recipes.get_mut(&recipe_id) else {
            return Ok(0);
        };

        if let Some(name) = patch.name {
            recipe.name = name;
        }
        if let Some(image_name) = patch.image_name {
            recipe.image_name = image_name;
        }
        if let Some(recipe_url) = patch.recipe_url {
            recipe.recipe_url = recipe_url;
        }
        if let Some(time_m) = patch.time_m {
            recipe.time_m = time_m;
        }
        if let Some(category) = patch.category {
            recipe.category = category;
        }
        if let Some(ingredients) = patch.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(prep_steps) = patch.prep_steps {
            recipe.prep_steps = prep_steps;
        }
        if let Some(author_id) = patch.author_id {
            recipe.author_id = author_id;
        }
        recipe.modified_at = next_modified(recipe.modified_at);

        Ok(1)
    }

    async fn delete_recipe_by_id(&self, id: &str) -> StoreResult<u64> {
        let recipe_id = parse_id("recipe", id)?;

        let mut state = self.state.write().await;
        let deleted = state.recipes.remove(&recipe_id).is_some();
        if deleted {
            info!("Deleted recipe {}", recipe_id);
        }
        Ok(u64::from(deleted))
    }

    async fn create_session(&self, session: NewSession) -> StoreResult<Uuid> {
        let id = session.id.unwrap_or_else(Uuid::now_v7);

        let mut state = self.state.write().await;
        if state.sessions.contains_key(&id) {
            return Err(StoreError::Conflict(format!("session {} already exists", id)));
        }

        state.sessions.insert(
            id,
            StoredSession {
                id,
                user_id: session.user_id,
                refresh_token: session.refresh_token,
                user_agent: session.user_agent,
                client_ip: session.client_ip,
                is_blocked: session.is_blocked,
                expires_at: session.expires_at,
                created_at: Utc::now(),
            },
        );

        info!("Created session {} for user {}", id, session.user_id);
        Ok(id)
    }

    async fn get_session_by_id(&self, id: &str) -> StoreResult<Session> {
        let session_id = parse_id("session", id)?;

        let state = self.state.read().await;
        state
            .sessions
            .get(&session_id)
            .map(|session| state.session(session))
            .ok_or_else(|| StoreError::not_found("session", "id", id))
    }
}
