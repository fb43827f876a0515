use chrono::Utc;

use crate::database::{Database, Paged};
use crate::error::Error;
use crate::utils::Page;

use super::schema::{CreateCampaign, UpdateCampaign};
use super::{Campaign, CampaignFilter, CampaignId};

#[tracing::instrument(skip(db))]
pub async fn create_campaign(db: &dyn Database, body: CreateCampaign) -> Result<Campaign, Error> {
    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        title: body.title,
        type_id: body.type_id,
        budget: body.budget,
        start_date: body.start_date,
        end_date: body.end_date,
        description: body.description,
        created_at: now,
        modified_at: now,
    };

    db.campaigns().insert_campaign(&campaign).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(
    db: &dyn Database,
    filter: &CampaignFilter,
    page: Page,
) -> Result<Paged<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns(filter, page).await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Option<Campaign>, Error> {
    let campaign = db.campaigns().fetch_campaign_by_id(campaign_id).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn expect_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Campaign, Error> {
    let campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn update_campaign(
    db: &dyn Database,
    campaign_id: CampaignId,
    changes: UpdateCampaign,
) -> Result<Campaign, Error> {
    let mut campaign = expect_campaign_by_id(db, campaign_id).await?;
    let expected_modified_at = campaign.modified_at;

    changes.apply(&mut campaign);
    campaign.modified_at = Utc::now();

    db.campaigns()
        .replace_campaign(&campaign, expected_modified_at)
        .await?;

    Ok(campaign)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::database::memory::MemoryDatabase;
    use crate::schema::Patch;
    use crate::utils::DateRange;

    fn create_body(title: &str) -> CreateCampaign {
        CreateCampaign {
            title: title.into(),
            type_id: None,
            budget: Some(1200.0),
            start_date: None,
            end_date: None,
            description: Some("launch week".into()),
        }
    }

    #[tokio::test]
    async fn can_create_campaign() {
        let db = MemoryDatabase::new();

        let campaign = create_campaign(&db, create_body("Blue Man Group"))
            .await
            .unwrap();

        assert_eq!(campaign.title, "Blue Man Group".to_string());
        assert_eq!(campaign.created_at, campaign.modified_at);

        let stored = get_campaign_by_id(&db, campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Blue Man Group");
    }

    #[tokio::test]
    async fn expect_campaign_by_id_returns_error_if_doesnt_exist() {
        let db = MemoryDatabase::new();
        let test_campaign_id = CampaignId::new();

        let campaign_result = expect_campaign_by_id(&db, test_campaign_id).await;

        assert_eq!(
            campaign_result.unwrap_err(),
            Error::CampaignNotFound {
                campaign_id: test_campaign_id
            }
        );
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let db = MemoryDatabase::new();
        let campaign = create_campaign(&db, create_body("Blue Man Group"))
            .await
            .unwrap();

        let changes = UpdateCampaign {
            budget: Patch::Value(900.0),
            description: Patch::Null,
            ..UpdateCampaign::default()
        };
        let updated = update_campaign(&db, campaign.id, changes).await.unwrap();

        assert_eq!(updated.title, "Blue Man Group");
        assert_eq!(updated.budget, Some(900.0));
        assert_eq!(updated.description, None);
        assert_eq!(updated.created_at, campaign.created_at);

        let stored = expect_campaign_by_id(&db, campaign.id).await.unwrap();
        assert_eq!(stored.budget, Some(900.0));
        assert_eq!(stored.description, None);
    }

    #[tokio::test]
    async fn listing_filters_by_start_date_and_paginates() {
        let db = MemoryDatabase::new();
        for day in 1..=3 {
            let mut body = create_body(&format!("Day {}", day));
            body.start_date = Some(Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap());
            create_campaign(&db, body).await.unwrap();
        }
        create_campaign(&db, create_body("Undated")).await.unwrap();

        let filter = CampaignFilter {
            type_id: None,
            starting: DateRange::new(
                Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()),
                None,
            )
            .unwrap(),
        };
        let page = Page::new(Some(1), None).unwrap();
        let campaigns = get_campaigns(&db, &filter, page).await.unwrap();

        assert_eq!(campaigns.total, 2);
        assert_eq!(campaigns.items.len(), 1);
    }
}
