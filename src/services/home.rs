use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::entities::home::{
    contact, feature, footer, footer_link, header, hero, nav_link, showcase, showcase_model,
    SINGLETON_ID,
};
use crate::error::ServiceError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSection {
    #[serde(flatten)]
    pub footer: footer::Model,
    pub links: Vec<footer_link::Model>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSection {
    #[serde(flatten)]
    pub header: header::Model,
    pub nav_links: Vec<nav_link::Model>,
}

/// Everything the landing page shows, assembled from the home tables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeSettings {
    pub header: HeaderSection,
    pub hero: hero::Model,
    pub features: Vec<feature::Model>,
    pub showcase: showcase::Model,
    pub models: Vec<showcase_model::Model>,
    pub contact: contact::Model,
    pub footer: FooterSection,
}

/// Reads the composite; single-row sections that were never saved come back
/// empty.
pub async fn load_home_settings<C: ConnectionTrait>(db: &C) -> Result<HomeSettings, ServiceError> {
    Ok(HomeSettings {
        header: HeaderSection {
            header: header::Entity::find_by_id(SINGLETON_ID)
                .one(db)
                .await?
                .unwrap_or_default(),
            nav_links: nav_link::Entity::find()
                .order_by_asc(nav_link::Column::Position)
                .all(db)
                .await?,
        },
        hero: hero::Entity::find_by_id(SINGLETON_ID)
            .one(db)
            .await?
            .unwrap_or_default(),
        features: feature::Entity::find()
            .order_by_asc(feature::Column::Position)
            .all(db)
            .await?,
        showcase: showcase::Entity::find_by_id(SINGLETON_ID)
            .one(db)
            .await?
            .unwrap_or_default(),
        models: showcase_model::Entity::find()
            .order_by_asc(showcase_model::Column::Position)
            .all(db)
            .await?,
        contact: contact::Entity::find_by_id(SINGLETON_ID)
            .one(db)
            .await?
            .unwrap_or_default(),
        footer: FooterSection {
            footer: footer::Entity::find_by_id(SINGLETON_ID)
                .one(db)
                .await?
                .unwrap_or_default(),
            links: footer_link::Entity::find()
                .order_by_asc(footer_link::Column::Position)
                .all(db)
                .await?,
        },
    })
}

/// Overwrites all nine tables: single-row sections are rewritten in place and
/// lists are replaced wholesale, positions following list order. Run inside a
/// transaction; concurrent saves are last-write-wins.
pub async fn save_home_settings<C: ConnectionTrait>(
    db: &C,
    settings: HomeSettings,
) -> Result<HomeSettings, ServiceError> {
    let HomeSettings {
        header: header_section,
        hero: hero_row,
        features,
        showcase: showcase_row,
        models,
        contact: contact_row,
        footer: footer_section,
    } = settings;

    header::Entity::delete_by_id(SINGLETON_ID).exec(db).await?;
    header::Entity::insert(header::ActiveModel {
        id: Set(SINGLETON_ID),
        logo_url: Set(header_section.header.logo_url),
        brand_name: Set(header_section.header.brand_name),
        brand_name_local: Set(header_section.header.brand_name_local),
        announcement: Set(header_section.header.announcement),
        announcement_local: Set(header_section.header.announcement_local),
    })
    .exec(db)
    .await?;

    hero::Entity::delete_by_id(SINGLETON_ID).exec(db).await?;
    hero::Entity::insert(hero::ActiveModel {
        id: Set(SINGLETON_ID),
        title: Set(hero_row.title),
        title_local: Set(hero_row.title_local),
        subtitle: Set(hero_row.subtitle),
        subtitle_local: Set(hero_row.subtitle_local),
        cta_label: Set(hero_row.cta_label),
        cta_label_local: Set(hero_row.cta_label_local),
        image_url: Set(hero_row.image_url),
    })
    .exec(db)
    .await?;

    showcase::Entity::delete_by_id(SINGLETON_ID).exec(db).await?;
    showcase::Entity::insert(showcase::ActiveModel {
        id: Set(SINGLETON_ID),
        title: Set(showcase_row.title),
        title_local: Set(showcase_row.title_local),
        description: Set(showcase_row.description),
        description_local: Set(showcase_row.description_local),
        image_url: Set(showcase_row.image_url),
        video_url: Set(showcase_row.video_url),
    })
    .exec(db)
    .await?;

    contact::Entity::delete_by_id(SINGLETON_ID).exec(db).await?;
    contact::Entity::insert(contact::ActiveModel {
        id: Set(SINGLETON_ID),
        phone: Set(contact_row.phone),
        whatsapp: Set(contact_row.whatsapp),
        email: Set(contact_row.email),
        address: Set(contact_row.address),
        address_local: Set(contact_row.address_local),
        map_url: Set(contact_row.map_url),
    })
    .exec(db)
    .await?;

    footer::Entity::delete_by_id(SINGLETON_ID).exec(db).await?;
    footer::Entity::insert(footer::ActiveModel {
        id: Set(SINGLETON_ID),
        about: Set(footer_section.footer.about),
        about_local: Set(footer_section.footer.about_local),
        copyright: Set(footer_section.footer.copyright),
    })
    .exec(db)
    .await?;

    nav_link::Entity::delete_many().exec(db).await?;
    if !header_section.nav_links.is_empty() {
        nav_link::Entity::insert_many(header_section.nav_links.into_iter().enumerate().map(
            |(position, link)| nav_link::ActiveModel {
                label: Set(link.label),
                label_local: Set(link.label_local),
                href: Set(link.href),
                position: Set(position as i32),
                ..Default::default()
            },
        ))
        .exec(db)
        .await?;
    }

    feature::Entity::delete_many().exec(db).await?;
    if !features.is_empty() {
        feature::Entity::insert_many(features.into_iter().enumerate().map(|(position, item)| {
            feature::ActiveModel {
                icon: Set(item.icon),
                title: Set(item.title),
                title_local: Set(item.title_local),
                description: Set(item.description),
                description_local: Set(item.description_local),
                position: Set(position as i32),
                ..Default::default()
            }
        }))
        .exec(db)
        .await?;
    }

    showcase_model::Entity::delete_many().exec(db).await?;
    if !models.is_empty() {
        showcase_model::Entity::insert_many(models.into_iter().enumerate().map(
            |(position, item)| showcase_model::ActiveModel {
                product_id: Set(item.product_id),
                name: Set(item.name),
                name_local: Set(item.name_local),
                tagline: Set(item.tagline),
                tagline_local: Set(item.tagline_local),
                image_url: Set(item.image_url),
                price: Set(item.price),
                position: Set(position as i32),
                ..Default::default()
            },
        ))
        .exec(db)
        .await?;
    }

    footer_link::Entity::delete_many().exec(db).await?;
    if !footer_section.links.is_empty() {
        footer_link::Entity::insert_many(footer_section.links.into_iter().enumerate().map(
            |(position, link)| footer_link::ActiveModel {
                label: Set(link.label),
                label_local: Set(link.label_local),
                url: Set(link.url),
                position: Set(position as i32),
                ..Default::default()
            },
        ))
        .exec(db)
        .await?;
    }

    load_home_settings(db).await
}
