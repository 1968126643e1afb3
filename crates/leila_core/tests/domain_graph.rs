use leila_core::{
    shared, Article, ArticleKind, ArticleRef, Category, CategoryRef, Notifier, Reader,
    ReaderJoined, ReaderRef,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct RecordingNotifier {
    notices: RefCell<Vec<ReaderJoined>>,
}

impl Notifier for RecordingNotifier {
    fn channel(&self) -> &'static str {
        "recording"
    }

    fn notify(&self, notice: &ReaderJoined) {
        self.notices.borrow_mut().push(notice.clone());
    }
}

fn article_in(category: &CategoryRef, name: &str) -> ArticleRef {
    Article::create(ArticleKind::Approved, name, category)
}

fn reader(name: &str) -> ReaderRef {
    shared(Reader::new(name))
}

#[test]
fn article_count_only_counts_direct_articles() {
    let history = shared(Category::new("history", None));
    let rome = shared(Category::new("rome", Some(Rc::clone(&history))));

    let _rome_articles: Vec<ArticleRef> = ["punic wars", "caesar", "augustus"]
        .into_iter()
        .map(|name| article_in(&rome, name))
        .collect();
    let _history_articles: Vec<ArticleRef> = ["chronology", "sources"]
        .into_iter()
        .map(|name| article_in(&history, name))
        .collect();

    assert_eq!(rome.borrow().article_count(), 3);
    assert_eq!(history.borrow().article_count(), 2);
    assert!(Rc::ptr_eq(&rome.borrow().parent().unwrap(), &history));
}

#[test]
fn filed_articles_stay_filed_after_their_handle_is_dropped() {
    let category = shared(Category::new("rome", None));
    drop(article_in(&category, "caesar"));
    drop(article_in(&category, "augustus"));

    let category = category.borrow();
    assert_eq!(category.article_count(), 2);
    assert_eq!(category.articles()[1].borrow().name, "augustus");
}

#[test]
fn reader_keeps_subscriptions_after_article_handle_is_dropped() {
    let alice = reader("Alice");
    {
        let category = shared(Category::new("rome", None));
        let article = article_in(&category, "caesar");
        Article::add_reader(&article, &alice);
    }

    let alice = alice.borrow();
    assert_eq!(alice.articles().len(), 1);
    let article = alice.articles()[0].borrow();
    assert_eq!(article.name, "caesar");
    assert_eq!(article.category().borrow().name, "rome");
}

#[test]
fn add_reader_links_both_sides_once() {
    let category = shared(Category::new("rome", None));
    let article = article_in(&category, "caesar");
    let alice = reader("Alice");

    Article::add_reader(&article, &alice);
    Article::add_reader(&article, &alice);

    assert_eq!(article.borrow().readers().len(), 1);
    assert_eq!(alice.borrow().articles().len(), 1);
    assert!(alice.borrow().is_subscribed_to(&article));
    assert!(article.borrow().has_reader(&alice));
}

#[test]
fn readers_keep_join_order() {
    let category = shared(Category::new("rome", None));
    let article = article_in(&category, "caesar");
    let readers: Vec<ReaderRef> = ["Alice", "Bob", "Carol"].into_iter().map(reader).collect();

    for reader in &readers {
        Article::add_reader(&article, reader);
    }

    let article = article.borrow();
    for (index, expected) in readers.iter().enumerate() {
        assert!(Rc::ptr_eq(&article.reader(index).unwrap(), expected));
    }
    assert!(article.reader(3).is_none());
}

#[test]
fn joining_notifies_existing_subscribers_on_every_channel() {
    let category = shared(Category::new("rome", None));
    let article = article_in(&category, "caesar");
    let first = Rc::new(RecordingNotifier::default());
    let second = Rc::new(RecordingNotifier::default());
    article.borrow_mut().attach(first.clone());
    article.borrow_mut().attach(second.clone());

    let alice = reader("Alice");
    let bob = reader("Bob");
    assert_eq!(Article::add_reader(&article, &alice), 0);
    assert!(first.notices.borrow().is_empty());

    assert_eq!(Article::add_reader(&article, &bob), 1);
    let expected = ReaderJoined {
        article: "caesar".to_string(),
        category: "rome".to_string(),
        subscriber: "Alice".to_string(),
        joined: "Bob".to_string(),
    };
    assert_eq!(*first.notices.borrow(), vec![expected.clone()]);
    assert_eq!(*second.notices.borrow(), vec![expected]);
}

#[test]
fn repeated_join_notifies_again_without_relinking() {
    let category = shared(Category::new("rome", None));
    let article = article_in(&category, "caesar");
    let recorder = Rc::new(RecordingNotifier::default());
    article.borrow_mut().attach(recorder.clone());

    let alice = reader("Alice");
    let bob = reader("Bob");
    Article::add_reader(&article, &alice);
    Article::add_reader(&article, &bob);
    Article::add_reader(&article, &bob);

    assert_eq!(article.borrow().readers().len(), 2);
    let notices = recorder.notices.borrow();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|notice| notice.subscriber == "Alice"));
}

#[test]
fn attaching_the_same_channel_twice_is_a_no_op() {
    let category = shared(Category::new("rome", None));
    let article = article_in(&category, "caesar");
    let recorder: Rc<dyn Notifier> = Rc::new(RecordingNotifier::default());

    article.borrow_mut().attach(Rc::clone(&recorder));
    article.borrow_mut().attach(recorder);

    assert_eq!(article.borrow().notifier_count(), 1);
}

#[test]
fn deep_clone_matches_the_original_at_clone_time() {
    let category = shared(Category::new("rome", None));
    let article = article_in(&category, "caesar");
    let mut alice = Reader::new("Alice");
    alice.id = Some(11);
    Article::add_reader(&article, &shared(alice));
    let bob = reader("Bob");
    Article::add_reader(&article, &bob);

    let clone = Article::deep_clone(&article);

    assert_eq!(clone.borrow().snapshot(), article.borrow().snapshot());
    assert!(!Rc::ptr_eq(&clone, &article));
    assert!(!Rc::ptr_eq(&clone.borrow().category(), &category));
    assert!(!Rc::ptr_eq(&clone.borrow().reader(1).unwrap(), &bob));
}

#[test]
fn deep_clone_reader_lists_are_independent() {
    let category = shared(Category::new("rome", None));
    let article = article_in(&category, "caesar");
    Article::add_reader(&article, &reader("Alice"));

    let clone = Article::deep_clone(&article);

    let carol = reader("Carol");
    Article::add_reader(&clone, &carol);
    assert_eq!(clone.borrow().readers().len(), 2);
    assert_eq!(article.borrow().readers().len(), 1);
    assert!(!carol.borrow().is_subscribed_to(&article));

    let dave = reader("Dave");
    Article::add_reader(&article, &dave);
    assert_eq!(article.borrow().readers().len(), 2);
    assert_eq!(clone.borrow().readers().len(), 2);
    assert!(!clone.borrow().has_reader(&dave));
}

#[test]
fn deep_clone_copies_category_chain_without_touching_originals() {
    let history = shared(Category::new("history", None));
    let rome = shared(Category::new("rome", Some(Rc::clone(&history))));
    let article = article_in(&rome, "caesar");

    let clone = Article::deep_clone(&article);
    let cloned_category = clone.borrow().category();

    assert_eq!(cloned_category.borrow().id(), rome.borrow().id());
    assert_eq!(cloned_category.borrow().article_count(), 1);
    assert!(Rc::ptr_eq(&cloned_category.borrow().articles()[0], &clone));
    let cloned_parent = cloned_category.borrow().parent().unwrap();
    assert_eq!(cloned_parent.borrow().name, "history");
    assert!(!Rc::ptr_eq(&cloned_parent, &history));

    assert_eq!(rome.borrow().article_count(), 1);
    assert_eq!(history.borrow().article_count(), 0);
}

#[test]
fn deep_clone_copies_sibling_articles_and_other_subscriptions() {
    let rome = shared(Category::new("rome", None));
    let greece = shared(Category::new("greece", None));
    let caesar = article_in(&rome, "caesar");
    let augustus = article_in(&rome, "augustus");
    let marathon = article_in(&greece, "marathon");
    let alice = reader("Alice");
    let bob = reader("Bob");
    Article::add_reader(&caesar, &alice);
    Article::add_reader(&augustus, &alice);
    Article::add_reader(&marathon, &alice);
    Article::add_reader(&marathon, &bob);

    let clone = Article::deep_clone(&caesar);

    assert_eq!(clone.borrow().snapshot(), caesar.borrow().snapshot());
    let cloned_rome = clone.borrow().category();
    assert_eq!(cloned_rome.borrow().article_count(), 2);
    assert!(Rc::ptr_eq(&cloned_rome.borrow().articles()[0], &clone));

    let cloned_alice = clone.borrow().reader(0).unwrap();
    let cloned_alice = cloned_alice.borrow();
    assert_eq!(cloned_alice.articles().len(), 3);
    assert!(Rc::ptr_eq(&cloned_alice.articles()[0], &clone));
    assert!(Rc::ptr_eq(
        &cloned_alice.articles()[1],
        &cloned_rome.borrow().articles()[1]
    ));

    let cloned_marathon = Rc::clone(&cloned_alice.articles()[2]);
    let cloned_marathon = cloned_marathon.borrow();
    assert_eq!(cloned_marathon.readers().len(), 2);
    assert!(!Rc::ptr_eq(&cloned_marathon.reader(1).unwrap(), &bob));
    assert!(!Rc::ptr_eq(&cloned_marathon.category(), &greece));
    assert!(cloned_marathon.has_reader(&clone.borrow().reader(0).unwrap()));

    assert_eq!(rome.borrow().article_count(), 2);
    assert_eq!(alice.borrow().articles().len(), 3);
    assert_eq!(bob.borrow().articles().len(), 1);
}

#[test]
fn deep_clone_renaming_does_not_rename_original() {
    let category = shared(Category::new("rome", None));
    let article = article_in(&category, "caesar");
    let clone = Article::deep_clone(&article);

    clone.borrow_mut().name = "copy_caesar".to_string();

    assert_eq!(article.borrow().name, "caesar");
}
