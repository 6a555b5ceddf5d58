use crate::models::{
    RawAppDetail, Store, UnifiedAppDetail, UnifiedAppItem, UnifiedCategory, UnifiedComment,
    UnifiedDownloadSource, UnifiedUserLite,
};
use crate::shop_api::{ShopApp, ShopAppDetail, ShopCategory, ShopDownload, ShopReview, ShopUser};
use crate::utils::{format_size, non_empty, parse_datetime, strip_html};

use super::{is_root_reply, positive_id};

pub fn category(c: ShopCategory) -> UnifiedCategory {
    UnifiedCategory {
        id: c.cid.to_string(),
        name: c.cname,
    }
}

pub fn item(app: ShopApp) -> UnifiedAppItem {
    UnifiedAppItem::new(
        Store::Shop,
        app.app_id.to_string(),
        app.version_code.to_string(),
        app.app_name,
        app.app_icon.unwrap_or_default(),
        app.app_size.map(format_size),
    )
}

pub fn user(u: ShopUser) -> UnifiedUserLite {
    UnifiedUserLite {
        id: u.user_id.to_string(),
        name: u.nickname,
        avatar_url: non_empty(u.avatar),
    }
}

pub fn detail(d: ShopAppDetail) -> UnifiedAppDetail {
    let item = UnifiedAppItem::new(
        Store::Shop,
        d.app_id.to_string(),
        d.version_code.to_string(),
        d.app_name.clone(),
        d.app_icon.clone().unwrap_or_default(),
        d.app_size.map(format_size),
    );
    let previews = d
        .screenshots
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    UnifiedAppDetail {
        item,
        description: d.describe.as_deref().map(strip_html).unwrap_or_default(),
        previews,
        update_log: non_empty(d.update_log.clone()),
        download_count: d.download_count,
        review_count: d.review_count,
        uploader: d.developer.clone().map(user).unwrap_or_default(),
        raw: RawAppDetail::Shop(d),
    }
}

pub fn review(r: ShopReview) -> UnifiedComment {
    convert_review(r, true)
}

fn convert_review(r: ShopReview, with_parent: bool) -> UnifiedComment {
    let parent_id = r.parent_id.or(r.parent.as_ref().map(|p| p.id));
    let father_reply = if with_parent && !is_root_reply(parent_id) {
        r.parent.map(|p| Box::new(convert_review(*p, false)))
    } else {
        None
    };
    UnifiedComment {
        id: r.id.to_string(),
        content: r.content,
        send_time: r.time.as_deref().and_then(parse_datetime).unwrap_or(0),
        sender: r.user.map(user).unwrap_or_default(),
        father_reply,
        app_id: positive_id(r.app_id),
        version_id: r.version_code.map(|v| v.to_string()),
        // 0 means unrated
        rating: r.rating.filter(|v| *v > 0).map(|v| v.min(5)),
        store: Store::Shop,
    }
}

pub fn download(d: ShopDownload) -> UnifiedDownloadSource {
    UnifiedDownloadSource {
        name: if d.title.trim().is_empty() {
            "Download".to_string()
        } else {
            d.title
        },
        url: d.link,
        is_official: d.official,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParentApp;

    #[test]
    fn item_formats_size() {
        let app: ShopApp = serde_json::from_str(
            r#"{"app_id": 42, "version_code": 7, "app_name": "Calc", "app_size": 2097152}"#,
        )
        .unwrap();
        let item = item(app);
        assert_eq!(item.size.as_deref(), Some("2.0 MB"));
        assert_eq!(item.unique_id, "shop-42-7");
    }

    #[test]
    fn detail_strips_html_and_splits_screenshots() {
        let raw: ShopAppDetail = serde_json::from_str(
            r#"{"app_id": 1, "app_name": "Calc", "describe": "<p>Adds numbers</p>",
                "screenshots": "a.png, b.png,,", "download_count": 10, "review_count": 2,
                "rating_average": 4.5}"#,
        )
        .unwrap();
        let d = detail(raw);
        assert_eq!(d.description, "Adds numbers");
        assert_eq!(d.previews, vec!["a.png".to_string(), "b.png".to_string()]);
        assert_eq!(d.raw.store(), Store::Shop);
        assert_eq!(d.uploader, UnifiedUserLite::default());
    }

    #[test]
    fn review_keeps_rating_and_time() {
        let raw: ShopReview = serde_json::from_str(
            r#"{"id": 5, "content": "ok", "rating": 9, "time": "1970-01-01 00:01:00",
                "parent_id": -1, "app_id": 3}"#,
        )
        .unwrap();
        let c = review(raw);
        assert_eq!(c.rating, Some(5));
        assert_eq!(c.send_time, 60);
        assert!(c.father_reply.is_none());
        assert!(c.is_review());
    }

    #[test]
    fn unrated_review_has_no_stars() {
        let raw: ShopReview =
            serde_json::from_str(r#"{"id": 6, "content": "hm", "rating": 0, "parent_id": 5}"#).unwrap();
        let c = review(raw);
        assert_eq!(c.rating, None);
        assert!(!c.is_review());
    }

    #[test]
    fn review_for_deleted_app_is_degraded_not_fatal() {
        let raw: ShopReview =
            serde_json::from_str(r#"{"id": 5, "time": "garbage", "app_id": null}"#).unwrap();
        let c = review(raw);
        assert_eq!(c.send_time, 0);
        assert_eq!(c.parent_app(), ParentApp::Missing);
    }
}
