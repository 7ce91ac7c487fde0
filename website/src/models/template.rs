use roster::actor::Actor;

#[derive(Clone)]
pub struct TemplateData {
    pub title: String,
    pub actor: Actor,
    pub is_org_admin: bool,
}

impl TemplateData {
    pub fn new(actor: Actor) -> TemplateData {
        let is_org_admin = actor.is_org_admin();

        TemplateData {
            title: String::from(""),
            actor,
            is_org_admin,
        }
    }
}
