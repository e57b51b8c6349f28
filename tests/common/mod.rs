//! Shared fixture: a small library spanning two centuries

#![allow(dead_code)]

use bookdb::catalog::BookQueries;
use bookdb::schema::Book;

pub fn books() -> Vec<Book> {
    vec![
        book("The Great Gatsby", "F. Scott Fitzgerald", "Classic", 1925, 10.99, 5),
        book("The Good Earth", "Pearl S. Buck", "Historical Fiction", 1931, 12.5, 0),
        book("Frankenstein", "Mary Shelley", "Gothic Fiction", 1818, 8.99, 4),
        book("Dracula", "Bram Stoker", "Gothic Fiction", 1897, 9.5, 0),
        book("The Alchemist", "Paulo Coelho", "Fiction", 1988, 14.0, 6),
        book("Moby Dick", "Herman Melville", "Adventure", 1851, 11.5, 2),
        book("The Night Circus", "Erin Morgenstern", "Fantasy", 2011, 15.0, 3),
        book("Gone Girl", "Gillian Flynn", "Mystery", 2012, 13.0, 8),
        book("Klara and the Sun", "Kazuo Ishiguro", "Literary Fiction", 2021, 18.0, 2),
        book("The Buried Giant", "Kazuo Ishiguro", "Fantasy", 2015, 12.0, 0),
        book("Normal People", "Sally Rooney", "Literary Fiction", 2018, 11.0, 5),
        book("Circe", "Madeline Miller", "Fantasy", 2018, 16.5, 1),
        book("Project Hail Mary", "Andy Weir", "Science Fiction", 2021, 17.0, 4),
        book("The Remains of the Day", "Kazuo Ishiguro", "Literary Fiction", 1989, 10.0, 3),
    ]
}

pub fn library() -> BookQueries {
    let mut queries = BookQueries::new();
    queries.insert_many(books().iter()).unwrap();
    queries
}

pub fn indexed_library() -> BookQueries {
    let mut queries = library();
    queries.ensure_indexes().unwrap();
    queries
}

pub fn titles<'a, I>(books: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Book>,
{
    books.into_iter().map(|b| b.title.clone()).collect()
}

fn book(title: &str, author: &str, genre: &str, year: i32, price: f64, stock: u32) -> Book {
    Book::new(title, author)
        .with_genre(genre)
        .with_published_year(year)
        .with_price(price)
        .with_stock(stock)
}
