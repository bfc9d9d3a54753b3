//! Behaviour shared by every store adapter
//!
//! Each scenario creates uniquely named records so the same functions can run
//! against a fresh in-memory store or a shared PostgreSQL database.

#![allow(dead_code)]

use chrono::{TimeDelta, Utc};
use store::{
    Pagination, Store, StoreError,
    models::{
        AmountUnit, AuthorPatch, Category, Ingredient, NewAuthor, NewRecipe, NewSession, NewUser,
        PrepStep, RecipePatch, Role, UserPatch,
    },
};
use uuid::Uuid;

pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7().simple())
}

pub async fn create_user(store: &dyn Store) -> Uuid {
    store
        .create_user(NewUser {
            email: format!("{}@example.com", unique("cook")),
            password_hash: "$argon2id$v=19$hash".to_string(),
            role: Role::User,
            is_active: true,
        })
        .await
        .unwrap()
}

pub fn new_author(name: &str, user_id: Uuid) -> NewAuthor {
    NewAuthor {
        name: name.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Baker".to_string(),
        website_url: "https://example.com".to_string(),
        instagram_url: String::new(),
        youtube_url: String::new(),
        image_name: "ada.png".to_string(),
        user_id,
    }
}

pub fn new_recipe(name: &str, author_id: Uuid, user_id: Uuid) -> NewRecipe {
    NewRecipe {
        name: name.to_string(),
        image_name: "pancakes.jpg".to_string(),
        recipe_url: "https://example.com/pancakes".to_string(),
        time_m: 25,
        category: Category::Breakfast,
        ingredients: vec![
            Ingredient {
                name: "flour".to_string(),
                amount: 200,
                unit: AmountUnit::Grams,
            },
            Ingredient {
                name: "milk".to_string(),
                amount: 300,
                unit: AmountUnit::Milliliters,
            },
        ],
        prep_steps: vec!["Whisk".to_string(), "Rest".to_string(), "Fry".to_string()],
        author_id,
        user_id,
    }
}

pub async fn pages_partition_sorted_set(store: &dyn Store) {
    let user_id = create_user(store).await;
    let prefix = unique("paged");
    let mut created = Vec::new();
    for suffix in ["e", "a", "d", "b", "c"] {
        let name = format!("{}-{}", prefix, suffix);
        store
            .create_author(new_author(&name, user_id))
            .await
            .unwrap();
        created.push(name);
    }

    let mut seen = Vec::new();
    let mut page_id = 1;
    loop {
        let page = store
            .get_all_authors(Pagination::new(page_id, 2))
            .await
            .unwrap();
        assert!(page.len() <= 2);
        if page.is_empty() {
            break;
        }
        seen.extend(page.into_iter().map(|author| author.profile.name));
        page_id += 1;
    }

    let mut sorted = seen.clone();
    sorted.sort();
    assert_eq!(seen, sorted, "pages must be ascending by name");

    let ours: Vec<&String> = seen.iter().filter(|name| name.starts_with(&prefix)).collect();
    created.sort();
    assert_eq!(ours, created.iter().collect::<Vec<_>>());
}

pub async fn invalid_pagination_is_rejected(store: &dyn Store) {
    for pagination in [
        Pagination::new(0, 10),
        Pagination::new(1, 501),
        Pagination::default(),
    ] {
        assert!(matches!(
            store.get_all_users(pagination).await,
            Err(StoreError::Validation(_))
        ));
    }
}

pub async fn duplicate_author_name_conflicts(store: &dyn Store) {
    let user_id = create_user(store).await;
    let name = unique("Nigella");

    store.create_author(new_author(&name, user_id)).await.unwrap();
    let err = store
        .create_author(new_author(&name, user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let mut count = 0;
    let mut page_id = 1;
    loop {
        let page = store
            .get_all_authors(Pagination::new(page_id, 500))
            .await
            .unwrap();
        if page.is_empty() {
            break;
        }
        count += page.iter().filter(|a| a.profile.name == name).count();
        page_id += 1;
    }
    assert_eq!(count, 1);
}

pub async fn duplicate_email_conflicts(store: &dyn Store) {
    let email = format!("{}@example.com", unique("dup"));
    let new_user = || NewUser {
        email: email.clone(),
        password_hash: "hash".to_string(),
        role: Role::User,
        is_active: false,
    };

    let id = store.create_user(new_user()).await.unwrap();
    assert!(matches!(
        store.create_user(new_user()).await,
        Err(StoreError::Conflict(_))
    ));

    let user = store.get_user_by_email(&email).await.unwrap();
    assert_eq!(user.id, id);
    assert!(!user.is_active);
}

pub async fn delete_absent_and_referenced(store: &dyn Store) {
    let user_id = create_user(store).await;
    let author_id = store
        .create_author(new_author(&unique("Referenced"), user_id))
        .await
        .unwrap();
    let recipe_id = store
        .create_recipe(new_recipe(&unique("Shakshuka"), author_id, user_id))
        .await
        .unwrap();

    let absent = Uuid::now_v7().to_string();
    assert_eq!(store.delete_author_by_id(&absent).await.unwrap(), 0);
    assert_eq!(store.delete_recipe_by_id(&absent).await.unwrap(), 0);
    assert_eq!(store.delete_user_by_id(&absent).await.unwrap(), 0);

    let err = store
        .delete_author_by_id(&author_id.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(store.get_author_by_id(&author_id.to_string()).await.is_ok());

    let err = store
        .delete_user_by_id(&user_id.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    assert_eq!(
        store
            .delete_recipe_by_id(&recipe_id.to_string())
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        store
            .delete_author_by_id(&author_id.to_string())
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        store.delete_user_by_id(&user_id.to_string()).await.unwrap(),
        1
    );
}

pub async fn recipe_patch_changes_only_name(store: &dyn Store) {
    let user_id = create_user(store).await;
    let author_id = store
        .create_author(new_author(&unique("Patched"), user_id))
        .await
        .unwrap();
    let recipe_id = store
        .create_recipe(new_recipe(&unique("Crepes"), author_id, user_id))
        .await
        .unwrap()
        .to_string();
    let before = store.get_recipe_by_id(&recipe_id).await.unwrap();

    let new_name = unique("New");
    let modified = store
        .update_recipe_by_id(
            &recipe_id,
            RecipePatch {
                name: Some(new_name.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(modified, 1);

    let after = store.get_recipe_by_id(&recipe_id).await.unwrap();
    assert_eq!(after.name, new_name);
    assert_eq!(after.ingredients, before.ingredients);
    assert_eq!(after.prep_steps, before.prep_steps);
    assert_eq!(after.category, before.category);
    assert_eq!(after.time_m, before.time_m);
    assert!(after.modified_at > before.modified_at);
    assert_eq!(after.created_at, before.created_at);
}

pub async fn prep_steps_are_ranked_on_create(store: &dyn Store) {
    let user_id = create_user(store).await;
    let author_id = store
        .create_author(new_author(&unique("Ranked"), user_id))
        .await
        .unwrap();
    let recipe_id = store
        .create_recipe(new_recipe(&unique("Focaccia"), author_id, user_id))
        .await
        .unwrap()
        .to_string();

    let recipe = store.get_recipe_by_id(&recipe_id).await.unwrap();
    assert_eq!(
        recipe.prep_steps,
        vec![
            PrepStep {
                rank: 1,
                description: "Whisk".to_string()
            },
            PrepStep {
                rank: 2,
                description: "Rest".to_string()
            },
            PrepStep {
                rank: 3,
                description: "Fry".to_string()
            },
        ]
    );
}

pub async fn explicit_zero_values_overwrite(store: &dyn Store) {
    let user_id = create_user(store).await;
    let id = user_id.to_string();

    let modified = store
        .update_user_by_id(
            &id,
            UserPatch {
                is_active: Some(false),
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(modified, 1);

    let user = store.get_user_by_id(&id).await.unwrap();
    assert!(!user.is_active);
    assert_eq!(user.role, Role::Admin);

    let author_id = store
        .create_author(new_author(&unique("Cleared"), user_id))
        .await
        .unwrap();
    let recipe_id = store
        .create_recipe(new_recipe(&unique("Soup"), author_id, user_id))
        .await
        .unwrap()
        .to_string();
    store
        .update_recipe_by_id(
            &recipe_id,
            RecipePatch {
                ingredients: Some(vec![]),
                time_m: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let recipe = store.get_recipe_by_id(&recipe_id).await.unwrap();
    assert!(recipe.ingredients.is_empty());
    assert_eq!(recipe.time_m, 0);
    assert_eq!(recipe.prep_steps.len(), 3);
}

pub async fn modified_at_advances_on_empty_patch(store: &dyn Store) {
    let user_id = create_user(store).await;
    let author_id = store
        .create_author(new_author(&unique("Touched"), user_id))
        .await
        .unwrap()
        .to_string();

    let before = store.get_author_by_id(&author_id).await.unwrap();
    for _ in 0..3 {
        assert_eq!(
            store
                .update_author_by_id(&author_id, AuthorPatch::default())
                .await
                .unwrap(),
            1
        );
    }
    let after = store.get_author_by_id(&author_id).await.unwrap();

    assert!(after.modified_at > before.modified_at);
    assert_eq!(after.profile, before.profile);
}

pub async fn update_absent_returns_zero(store: &dyn Store) {
    let absent = Uuid::now_v7().to_string();

    assert_eq!(
        store
            .update_user_by_id(&absent, UserPatch::default())
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        store
            .update_recipe_by_id(
                &absent,
                RecipePatch {
                    name: Some(unique("Ghost")),
                    ..Default::default()
                }
            )
            .await
            .unwrap(),
        0
    );
}

pub async fn update_absent_with_taken_key_returns_zero(store: &dyn Store) {
    let user_id = create_user(store).await;
    let email = store
        .get_user_by_id(&user_id.to_string())
        .await
        .unwrap()
        .email;
    let author_name = unique("Taken Author");
    let author_id = store
        .create_author(new_author(&author_name, user_id))
        .await
        .unwrap();
    let recipe_name = unique("Taken Recipe");
    store
        .create_recipe(new_recipe(&recipe_name, author_id, user_id))
        .await
        .unwrap();
    let absent = Uuid::now_v7().to_string();

    let updated = store
        .update_user_by_id(
            &absent,
            UserPatch {
                email: Some(email),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated, 0);

    let updated = store
        .update_author_by_id(
            &absent,
            AuthorPatch {
                name: Some(author_name),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated, 0);

    let updated = store
        .update_recipe_by_id(
            &absent,
            RecipePatch {
                name: Some(recipe_name),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated, 0);
}

pub async fn malformed_ids_are_validation_errors(store: &dyn Store) {
    for id in ["", "not-an-id", "65f1c0ffee00112233445566"] {
        assert!(matches!(
            store.get_user_by_id(id).await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.get_recipe_by_id(id).await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.update_author_by_id(id, AuthorPatch::default()).await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.delete_author_by_id(id).await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.get_session_by_id(id).await,
            Err(StoreError::Validation(_))
        ));
    }
}

pub async fn missing_records_are_not_found(store: &dyn Store) {
    let absent = Uuid::now_v7().to_string();

    assert!(matches!(
        store.get_author_by_id(&absent).await,
        Err(StoreError::NotFound { entity: "author", .. })
    ));
    assert!(matches!(
        store.get_recipe_by_id(&absent).await,
        Err(StoreError::NotFound { entity: "recipe", .. })
    ));
    assert!(matches!(
        store.get_user_by_email("nobody@example.com").await,
        Err(StoreError::NotFound { field: "email", .. })
    ));
}

pub async fn author_embeds_owner_snapshot(store: &dyn Store) {
    let user_id = create_user(store).await;
    let owner = store.get_user_by_id(&user_id.to_string()).await.unwrap();
    let author_id = store
        .create_author(new_author(&unique("Owned"), user_id))
        .await
        .unwrap();

    let author = store
        .get_author_by_id(&author_id.to_string())
        .await
        .unwrap();
    let snapshot = author.user_created.clone().unwrap();
    assert_eq!(snapshot.id, owner.id);
    assert_eq!(snapshot.email, owner.email);

    let json = serde_json::to_value(&author).unwrap();
    assert!(json.get("userId").is_none());
    assert_eq!(json["userCreated"]["id"], owner.id.to_string());
}

pub async fn recipe_embeds_author_and_owner(store: &dyn Store) {
    let user_id = create_user(store).await;
    let author_id = store
        .create_author(new_author(&unique("Embedded"), user_id))
        .await
        .unwrap();
    let recipe_id = store
        .create_recipe(new_recipe(&unique("Risotto"), author_id, user_id))
        .await
        .unwrap();

    let recipe = store
        .get_recipe_by_id(&recipe_id.to_string())
        .await
        .unwrap();
    let author = recipe.author.clone().unwrap();
    assert_eq!(author.id, author_id);
    assert_eq!(author.first_name, "Ada");
    assert_eq!(recipe.user_created.as_ref().unwrap().id, user_id);

    let json = serde_json::to_value(&recipe).unwrap();
    assert!(json.get("authorId").is_none());
    assert!(json.get("userId").is_none());
    assert!(json["author"].get("userCreated").is_none());
}

pub async fn dangling_references_have_no_snapshot(store: &dyn Store) {
    let ghost = Uuid::now_v7();
    let author_id = store
        .create_author(new_author(&unique("Orphan"), ghost))
        .await
        .unwrap();

    let author = store
        .get_author_by_id(&author_id.to_string())
        .await
        .unwrap();
    assert!(author.user_created.is_none());

    let recipe_id = store
        .create_recipe(new_recipe(&unique("Orphaned"), Uuid::now_v7(), ghost))
        .await
        .unwrap();
    let recipe = store
        .get_recipe_by_id(&recipe_id.to_string())
        .await
        .unwrap();
    assert!(recipe.author.is_none());
    assert!(recipe.user_created.is_none());

    store
        .delete_recipe_by_id(&recipe_id.to_string())
        .await
        .unwrap();
    store
        .delete_author_by_id(&author_id.to_string())
        .await
        .unwrap();
}

pub async fn session_embeds_user(store: &dyn Store) {
    let user_id = create_user(store).await;
    let session_id = Uuid::now_v7();
    let expires_at = Utc::now() + TimeDelta::days(1);

    let id = store
        .create_session(NewSession {
            id: Some(session_id),
            user_id,
            refresh_token: "refresh-token".to_string(),
            user_agent: "curl/8.0".to_string(),
            client_ip: "127.0.0.1".to_string(),
            is_blocked: false,
            expires_at,
        })
        .await
        .unwrap();
    assert_eq!(id, session_id);

    let session = store.get_session_by_id(&id.to_string()).await.unwrap();
    assert_eq!(session.refresh_token, "refresh-token");
    assert_eq!(session.user.as_ref().unwrap().id, user_id);
    assert!(!session.is_expired_at(Utc::now()));

    let json = serde_json::to_value(&session).unwrap();
    assert!(json.get("refreshToken").is_none());
    assert!(json.get("userId").is_none());
}

/// A referenced author can be removed once its recipe is gone
pub async fn reference_lifecycle(store: &dyn Store) {
    let user_id = create_user(store).await;
    let author_x = store
        .create_author(new_author(&unique("X"), user_id))
        .await
        .unwrap()
        .to_string();
    let recipe_r = store
        .create_recipe(new_recipe(
            &unique("R"),
            author_x.parse().unwrap(),
            user_id,
        ))
        .await
        .unwrap()
        .to_string();

    assert!(matches!(
        store.delete_author_by_id(&author_x).await,
        Err(StoreError::Conflict(_))
    ));
    assert_eq!(store.delete_recipe_by_id(&recipe_r).await.unwrap(), 1);
    assert_eq!(store.delete_author_by_id(&author_x).await.unwrap(), 1);
}
