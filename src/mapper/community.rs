use crate::community_api::{
    CommunityApp, CommunityAppDetail, CommunityCategory, CommunityComment, CommunityDownload,
    CommunityUser,
};
use crate::models::{
    RawAppDetail, Store, UnifiedAppDetail, UnifiedAppItem, UnifiedCategory, UnifiedComment,
    UnifiedDownloadSource, UnifiedUserLite,
};
use crate::utils::non_empty;

use super::{is_root_reply, positive_id};

pub fn category(c: CommunityCategory) -> UnifiedCategory {
    UnifiedCategory {
        id: c.id.to_string(),
        name: c.name,
    }
}

pub fn item(app: CommunityApp) -> UnifiedAppItem {
    UnifiedAppItem::new(
        Store::Community,
        app.id.to_string(),
        app.apps_version_id.to_string(),
        app.appname,
        app.app_icon.unwrap_or_default(),
        non_empty(app.app_size),
    )
}

pub fn user(u: CommunityUser) -> UnifiedUserLite {
    UnifiedUserLite {
        id: u.id.to_string(),
        name: u.username,
        avatar_url: non_empty(u.usericon),
    }
}

pub fn detail(d: CommunityAppDetail) -> UnifiedAppDetail {
    let item = UnifiedAppItem::new(
        Store::Community,
        d.id.to_string(),
        d.apps_version_id.to_string(),
        d.appname.clone(),
        d.app_icon.clone().unwrap_or_default(),
        non_empty(d.app_size.clone()),
    );
    UnifiedAppDetail {
        item,
        description: d.app_explain.clone().unwrap_or_default(),
        previews: d
            .app_previews
            .iter()
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .collect(),
        update_log: non_empty(d.app_update.clone()),
        download_count: d.download_count,
        review_count: d.comment_count,
        uploader: d.user.clone().map(user).unwrap_or_default(),
        raw: RawAppDetail::Community(d),
    }
}

pub fn comment(c: CommunityComment) -> UnifiedComment {
    convert_comment(c, true)
}

fn convert_comment(c: CommunityComment, with_parent: bool) -> UnifiedComment {
    let parent_id = c.father_replyid.or(c.father_reply.as_ref().map(|p| p.id));
    let father_reply = if with_parent && !is_root_reply(parent_id) {
        c.father_reply.map(|p| Box::new(convert_comment(*p, false)))
    } else {
        None
    };
    UnifiedComment {
        id: c.id.to_string(),
        content: c.content,
        send_time: c.sendtime,
        sender: c.user.map(user).unwrap_or_default(),
        father_reply,
        app_id: positive_id(c.app_id),
        version_id: positive_id(c.apps_version_id),
        rating: None,
        store: Store::Community,
    }
}

pub fn download(d: CommunityDownload) -> UnifiedDownloadSource {
    UnifiedDownloadSource {
        name: if d.name.trim().is_empty() {
            "Download".to_string()
        } else {
            d.name
        },
        url: d.url,
        is_official: d.official,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParentApp;

    fn raw_comment(json: &str) -> CommunityComment {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn item_ids_and_defaults() {
        let app: CommunityApp =
            serde_json::from_str(r#"{"id": 12, "apps_version_id": 30, "appname": "Notes"}"#).unwrap();
        let item = item(app);
        assert_eq!(item.navigation_id, "12");
        assert_eq!(item.navigation_version_id, "30");
        assert_eq!(item.unique_id, "community-12-30");
        assert_eq!(item.icon_url, "");
        assert_eq!(item.size, None);
    }

    #[test]
    fn detail_keeps_raw_payload_of_same_store() {
        let raw: CommunityAppDetail = serde_json::from_str(
            r#"{"id": 1, "apps_version_id": 2, "appname": "X", "app_previews": ["a.png", " "],
                "app_tags": ["tool"], "user": {"id": 8, "username": "dev"}}"#,
        )
        .unwrap();
        let d = detail(raw);
        assert_eq!(d.raw.store(), d.store());
        assert_eq!(d.previews, vec!["a.png".to_string()]);
        assert_eq!(d.uploader.name, "dev");
        match &d.raw {
            RawAppDetail::Community(raw) => assert_eq!(raw.app_tags, vec!["tool".to_string()]),
            other => panic!("unexpected raw payload {:?}", other.store()),
        }
    }

    #[test]
    fn parent_is_mapped_one_level_only() {
        let c = raw_comment(
            r#"{"id": 3, "content": "c", "father_replyid": 2,
                "father_reply": {"id": 2, "content": "b", "father_replyid": 1,
                    "father_reply": {"id": 1, "content": "a", "father_replyid": -1}}}"#,
        );
        let mapped = comment(c);
        let parent = mapped.father_reply.expect("parent kept");
        assert_eq!(parent.id, "2");
        assert!(parent.father_reply.is_none());
    }

    #[test]
    fn sentinel_parent_means_root() {
        let c = raw_comment(
            r#"{"id": 3, "content": "c", "father_replyid": -1,
                "father_reply": {"id": 0, "content": ""}}"#,
        );
        assert!(comment(c).father_reply.is_none());
    }

    #[test]
    fn missing_app_id_maps_to_degraded_parent() {
        let c = raw_comment(r#"{"id": 3, "content": "c", "app_id": 0}"#);
        let mapped = comment(c);
        assert_eq!(mapped.parent_app(), ParentApp::Missing);

        let c = raw_comment(r#"{"id": 4, "app_id": 15, "apps_version_id": 2}"#);
        assert_eq!(
            comment(c).parent_app(),
            ParentApp::Available {
                app_id: "15".into(),
                version_id: Some("2".into())
            }
        );
    }
}
