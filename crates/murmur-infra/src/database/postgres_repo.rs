//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use murmur_core::domain::{Comment, Post, UserProfile};
use murmur_core::error::RepoError;
use murmur_core::feed::FeedCursor;
use murmur_core::ports::{
    BaseRepository, CommentRepository, FeedSource, PostRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

fn write_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint(err_str)
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Read-modify-write a post under a row lock.
    async fn modify<F, R>(&self, post_id: Uuid, f: F) -> Result<R, RepoError>
    where
        F: FnOnce(&mut Post) -> R + Send,
        R: Send,
    {
        let txn = self.db.begin().await.map_err(query_err)?;

        let model = PostEntity::find_by_id(post_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(query_err)?
            .ok_or(RepoError::NotFound)?;

        let mut post: Post = model.into();
        let result = f(&mut post);

        let active_model: post::ActiveModel = post.into();
        active_model.update(&txn).await.map_err(query_err)?;
        txn.commit().await.map_err(query_err)?;

        Ok(result)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = entity.clone().into();

        PostEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(post::Column::Id)
                    .update_columns([
                        post::Column::Content,
                        post::Column::LikesCount,
                        post::Column::CommentsCount,
                        post::Column::LikedBy,
                        post::Column::BookmarkedBy,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl FeedSource for PostgresPostRepository {
    async fn fetch_page(
        &self,
        after: Option<&FeedCursor>,
        limit: usize,
    ) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find();

        if let Some(cursor) = after {
            let created_at: sea_orm::prelude::DateTimeWithTimeZone = cursor.created_at.into();
            query = query.filter(
                Condition::any()
                    .add(post::Column::CreatedAt.lt(created_at))
                    .add(
                        Condition::all()
                            .add(post::Column::CreatedAt.eq(created_at))
                            .add(post::Column::Id.lt(cursor.id)),
                    ),
            );
        }

        let models = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        tracing::debug!(
            after = ?after.map(|c| c.id),
            limit,
            returned = models.len(),
            "Fetched feed page"
        );

        Ok(models.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        self.modify(post_id, |post| post.toggle_like(user_id)).await
    }

    async fn toggle_bookmark(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        self.modify(post_id, |post| post.toggle_bookmark(user_id))
            .await
    }

    async fn increment_comments(&self, post_id: Uuid, delta: i64) -> Result<(), RepoError> {
        self.modify(post_id, |post| {
            post.comments_count = post.comments_count.saturating_add_signed(delta);
        })
        .await
    }
}

/// PostgreSQL comment repository.
pub struct PostgresCommentRepository {
    db: DbConn,
}

impl PostgresCommentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn add(&self, comment: Comment) -> Result<Comment, RepoError> {
        let active_model: comment::ActiveModel = comment.clone().into();

        CommentEntity::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL user profile repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BaseRepository<UserProfile, Uuid> for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: UserProfile) -> Result<UserProfile, RepoError> {
        let active_model: user::ActiveModel = entity.clone().into();

        UserEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(user::Column::Uid)
                    .update_columns([
                        user::Column::Username,
                        user::Column::DisplayName,
                        user::Column::Email,
                        user::Column::PhotoUrl,
                        user::Column::Bio,
                        user::Column::Verified,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}
