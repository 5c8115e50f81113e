use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{
    Ambassador, AmbassadorWaitlist, BackgroundTask, OtpCode, Order, Reward, User,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    create_indexes(
        db,
        User::COLLECTION,
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index_unique(bson::doc! { "username": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        AmbassadorWaitlist::COLLECTION,
        vec![
            index_unique(bson::doc! { "email": 1 }),
            index_unique(bson::doc! { "phone": 1 }),
            index(bson::doc! { "status": 1, "created_at": -1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        Ambassador::COLLECTION,
        vec![
            index_unique(bson::doc! { "referral_code": 1 }),
            index_unique(bson::doc! { "phone": 1 }),
            index_unique(bson::doc! { "email": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        Order::COLLECTION,
        vec![
            index_unique(bson::doc! { "order_number": 1 }),
            index(bson::doc! { "status": 1, "created_at": -1 }),
            index(bson::doc! { "ambassador_id": 1, "created_at": -1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        Reward::COLLECTION,
        vec![
            index(bson::doc! { "ambassador_id": 1, "status": 1 }),
            index(bson::doc! { "order_id": 1 }),
        ],
    )
    .await?;

    create_indexes(
        db,
        OtpCode::COLLECTION,
        vec![
            index(bson::doc! { "phone": 1, "created_at": -1 }),
            // TTL: Mongo reaps codes once `expires_at` passes.
            IndexModel::builder()
                .keys(bson::doc! { "expires_at": 1 })
                .options(
                    IndexOptions::builder()
                        .expire_after(std::time::Duration::from_secs(0))
                        .build(),
                )
                .build(),
        ],
    )
    .await?;

    create_indexes(
        db,
        BackgroundTask::COLLECTION,
        vec![index(bson::doc! { "user_id": 1, "status": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
