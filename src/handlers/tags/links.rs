use crate::links::{rel, LinkDto, LinkService, Operation};

pub fn tag_links(links: &LinkService, id: &str, fields: Option<&str>) -> Vec<LinkDto> {
    let id = Some(id.to_string());
    vec![
        links.create(
            Operation::GetTag,
            rel::SELF,
            &[("id", id.clone()), ("fields", fields.map(str::to_string))],
        ),
        links.create(Operation::UpdateTag, rel::UPDATE, &[("id", id.clone())]),
        links.create(Operation::DeleteTag, rel::DELETE, &[("id", id)]),
    ]
}

pub fn tags_collection_links(links: &LinkService, sort: Option<&str>, fields: Option<&str>) -> Vec<LinkDto> {
    vec![
        links.create(
            Operation::GetTags,
            rel::SELF,
            &[("sort", sort.map(str::to_string)), ("fields", fields.map(str::to_string))],
        ),
        links.create(Operation::CreateTag, rel::CREATE, &[]),
    ]
}
