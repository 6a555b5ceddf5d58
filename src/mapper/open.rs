use crate::models::{
    RawAppDetail, Store, UnifiedAppDetail, UnifiedAppItem, UnifiedCategory,
    UnifiedDownloadSource, UnifiedUserLite,
};
use crate::open_api::{OpenApp, OpenAppDetail, OpenCategory, OpenFile, OpenUser};
use crate::utils::{format_size, non_empty};

pub fn category(c: OpenCategory) -> UnifiedCategory {
    UnifiedCategory {
        id: c.id.to_string(),
        name: c.title,
    }
}

pub fn item(app: OpenApp) -> UnifiedAppItem {
    UnifiedAppItem::new(
        Store::Open,
        app.id.to_string(),
        app.latest_version_id.to_string(),
        app.name,
        app.icon_url.unwrap_or_default(),
        app.size.map(format_size),
    )
}

pub fn user(u: OpenUser) -> UnifiedUserLite {
    UnifiedUserLite {
        id: u.id.to_string(),
        name: u.display_name,
        avatar_url: non_empty(u.avatar_url),
    }
}

pub fn detail(d: OpenAppDetail) -> UnifiedAppDetail {
    let item = UnifiedAppItem::new(
        Store::Open,
        d.id.to_string(),
        d.version_id.to_string(),
        d.name.clone(),
        d.icon_url.clone().unwrap_or_default(),
        d.size.map(format_size),
    );
    let description = non_empty(d.description.clone())
        .or_else(|| d.summary.clone())
        .unwrap_or_default();
    UnifiedAppDetail {
        item,
        description,
        previews: d.screenshots.iter().map(|s| s.url.clone()).collect(),
        update_log: non_empty(d.changelog.clone()),
        download_count: d.downloads,
        review_count: d.review_count,
        uploader: d.owner.clone().map(user).unwrap_or_default(),
        raw: RawAppDetail::Open(d),
    }
}

pub fn file(f: OpenFile) -> UnifiedDownloadSource {
    UnifiedDownloadSource {
        name: if f.label.trim().is_empty() {
            "Download".to_string()
        } else {
            f.label
        },
        url: f.url,
        is_official: !f.mirror,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_falls_back_to_summary() {
        let raw: OpenAppDetail = serde_json::from_str(
            r#"{"id": 4, "version_id": 9, "name": "Tool", "summary": "Short",
                "description": "", "screenshots": [{"url": "s1.png"}], "status": "pending"}"#,
        )
        .unwrap();
        let d = detail(raw);
        assert_eq!(d.description, "Short");
        assert_eq!(d.previews, vec!["s1.png".to_string()]);
        assert_eq!(d.item.unique_id, "open-4-9");
        match &d.raw {
            RawAppDetail::Open(raw) => assert_eq!(raw.status.as_deref(), Some("pending")),
            other => panic!("unexpected raw payload {:?}", other.store()),
        }
    }

    #[test]
    fn mirror_files_are_not_official() {
        let f: OpenFile =
            serde_json::from_str(r#"{"label": "", "url": "https://m/x.apk", "mirror": true}"#).unwrap();
        let src = file(f);
        assert!(!src.is_official);
        assert_eq!(src.name, "Download");
    }
}
