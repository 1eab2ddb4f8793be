//! User profile entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uid: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub created_at: DateTimeWithTimeZone,
    pub verified: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for murmur_core::domain::UserProfile {
    fn from(model: Model) -> Self {
        Self {
            uid: model.uid,
            username: model.username,
            display_name: model.display_name,
            email: model.email,
            photo_url: model.photo_url,
            bio: model.bio,
            created_at: model.created_at.into(),
            verified: model.verified,
        }
    }
}

impl From<murmur_core::domain::UserProfile> for ActiveModel {
    fn from(profile: murmur_core::domain::UserProfile) -> Self {
        Self {
            uid: Set(profile.uid),
            username: Set(profile.username),
            display_name: Set(profile.display_name),
            email: Set(profile.email),
            photo_url: Set(profile.photo_url),
            bio: Set(profile.bio),
            created_at: Set(profile.created_at.into()),
            verified: Set(profile.verified),
        }
    }
}
