use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use kingraph::db::Db;
use kingraph::graph::{infer_label, AddPersonRequest};
use kingraph::model::{FamilyId, Gender, NewPerson, Person, PersonId};
use kingraph::roles::RoleId;
use kingraph::Config;

#[derive(Parser, Debug)]
#[command(name = "kingraph")]
#[command(about = "Kinship graph engine: bind relationship roles and infer kin labels")]
struct Args {
    /// Emit results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize the database schema
    Init,
    /// Seed the three-generation demo family
    Seed {
        /// Family id to seed into
        #[arg(long, default_value_t = 1)]
        family: i64,
    },
    /// Add an unregistered member by name
    Add {
        name: String,
        /// Free-form relationship, canonicalized into a standard role
        #[arg(short, long)]
        relationship: Option<String>,
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        family: i64,
    },
    /// Bind a target member to an inviter under a role (invite acceptance)
    Bind {
        /// Role of the target relative to the inviter, e.g. "father" or 舅舅
        role: String,
        /// Id of the member who sent the invite
        inviter: i64,
        /// Id of the member being bound
        target: i64,
    },
    /// Infer the kin label a viewer uses for a target
    Label {
        viewer: i64,
        target: i64,
        #[arg(long, default_value_t = 1)]
        family: i64,
    },
    /// Print the label matrix for every pair in a family
    Matrix {
        #[arg(long, default_value_t = 1)]
        family: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.log_level()),
    )
    .init();

    let db = Db::new(config.db_path());
    db.init().await?;

    match args.command {
        Command::Init => {
            log::info!("database ready at {}", config.db_path().display());
        }
        Command::Seed { family } => {
            let people = seed_demo_family(&db, FamilyId(family)).await?;
            log::info!("seeded {} members into family {}", people.len(), family);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&people)?);
            } else {
                for person in &people {
                    println!("{}\t{}", person.id, person.name);
                }
            }
        }
        Command::Add {
            name,
            relationship,
            birth_date,
            family,
        } => {
            let name = name.trim().to_owned();
            if name.is_empty() {
                anyhow::bail!("member name must not be empty");
            }
            let outcome = db
                .add_person(
                    FamilyId(family),
                    AddPersonRequest {
                        name,
                        relationship,
                        birth_date,
                    },
                )
                .await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else if outcome.linked {
                println!(
                    "linked existing member {} ({})",
                    outcome.person.id, outcome.person.name
                );
            } else {
                println!("added member {} ({})", outcome.person.id, outcome.person.name);
            }
        }
        Command::Bind {
            role,
            inviter,
            target,
        } => {
            let bound = db
                .bind_by_role(&role, PersonId(inviter), PersonId(target))
                .await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&bound)?);
            } else {
                println!(
                    "bound member {} ({}) as {} of member {}",
                    bound.id, bound.name, role, inviter
                );
            }
        }
        Command::Label {
            viewer,
            target,
            family,
        } => {
            let label = db
                .infer_label(FamilyId(family), PersonId(viewer), PersonId(target))
                .await?;
            if args.json {
                println!("{}", serde_json::json!({ "label": label }));
            } else {
                println!("{}", label);
            }
        }
        Command::Matrix { family } => {
            let members = db.family_members(FamilyId(family)).await?;
            if args.json {
                let mut rows = Vec::with_capacity(members.len() * members.len());
                for viewer in &members {
                    for target in &members {
                        rows.push(serde_json::json!({
                            "viewer": viewer.id,
                            "target": target.id,
                            "label": infer_label(viewer.id, target.id, &members),
                        }));
                    }
                }
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_matrix(&members);
            }
        }
    }

    Ok(())
}

/// A three-generation demo family with no spouse edges: the inference
/// engine recognizes both couples through their shared children.
async fn seed_demo_family(db: &Db, family: FamilyId) -> Result<Vec<Person>> {
    let grandmother = db
        .create_person(demo_member(
            family,
            "林月娥",
            Gender::Female,
            Some("母亲"),
            NaiveDate::from_ymd_opt(1948, 10, 12),
            false,
        ))
        .await?;
    let grandfather = db
        .create_person(demo_member(
            family,
            "陈兴华",
            Gender::Male,
            Some("父亲"),
            NaiveDate::from_ymd_opt(1945, 3, 20),
            false,
        ))
        .await?;

    let mut father_fields = demo_member(
        family,
        "陈建国",
        Gender::Male,
        None,
        NaiveDate::from_ymd_opt(1965, 5, 12),
        true,
    );
    father_fields.father_id = Some(grandfather.id);
    father_fields.mother_id = Some(grandmother.id);
    let father = db.create_person(father_fields).await?;

    let mother = db
        .create_person(demo_member(
            family,
            "李美芳",
            Gender::Female,
            Some("妻子"),
            NaiveDate::from_ymd_opt(1968, 8, 15),
            false,
        ))
        .await?;

    let mut son_fields = demo_member(
        family,
        "陈小明",
        Gender::Male,
        Some("儿子"),
        NaiveDate::from_ymd_opt(2000, 6, 1),
        true,
    );
    son_fields.father_id = Some(father.id);
    son_fields.mother_id = Some(mother.id);
    let son = db.create_person(son_fields).await?;

    Ok(vec![grandmother, grandfather, father, mother, son])
}

fn demo_member(
    family: FamilyId,
    name: &str,
    gender: Gender,
    relationship: Option<&str>,
    birth_date: Option<NaiveDate>,
    registered: bool,
) -> NewPerson {
    let mut fields = NewPerson::new(family, name);
    fields.gender = gender;
    fields.registered = registered;
    fields.relationship = relationship.map(str::to_owned);
    fields.standard_role = relationship.map(RoleId::canonicalize);
    fields.birth_date = birth_date;
    fields
}

/// Tab-separated label square: rows are viewers, columns are targets.
fn print_matrix(members: &[Person]) {
    for target in members {
        print!("\t{}", target.name);
    }
    println!();
    for viewer in members {
        print!("{}", viewer.name);
        for target in members {
            print!("\t{}", infer_label(viewer.id, target.id, members));
        }
        println!();
    }
}
