//! Post entity for SeaORM.

use std::collections::BTreeSet;

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
    pub likes_count: i64,
    pub comments_count: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub liked_by: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub bookmarked_by: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Unreadable entries are dropped rather than failing the whole row.
fn ids_from_json(value: &Json) -> BTreeSet<Uuid> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .filter_map(|s| Uuid::parse_str(s).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn ids_to_json(ids: &BTreeSet<Uuid>) -> Json {
    Json::Array(ids.iter().map(|id| Json::String(id.to_string())).collect())
}

fn count_from_db(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn count_to_db(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for murmur_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            content: model.content,
            created_at: model.created_at.into(),
            likes_count: count_from_db(model.likes_count),
            comments_count: count_from_db(model.comments_count),
            liked_by: ids_from_json(&model.liked_by),
            bookmarked_by: ids_from_json(&model.bookmarked_by),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<murmur_core::domain::Post> for ActiveModel {
    fn from(post: murmur_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            content: Set(post.content),
            created_at: Set(post.created_at.into()),
            likes_count: Set(count_to_db(post.likes_count)),
            comments_count: Set(count_to_db(post.comments_count)),
            liked_by: Set(ids_to_json(&post.liked_by)),
            bookmarked_by: Set(ids_to_json(&post.bookmarked_by)),
        }
    }
}
